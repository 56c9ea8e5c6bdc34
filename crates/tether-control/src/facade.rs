//! The facade: bound commands plus the lifecycle operations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tether_core::{Dependencies, DependencyPatch, DependencySpec, Status};
use tether_store::DependencyStore;
use uuid::Uuid;

use crate::callable::{CloseFn, Command, HealthCheck, Reply};
use crate::error::{ControlError, Result};
use crate::lifecycle::{Lifecycle, LifecycleController};
use crate::managed::Managed;
use crate::options::CloseOptions;

/// A command bound to the store of the facade it was registered on.
///
/// Every call reads the store at call time, so a bound command kept around
/// after a `close` or a client swap sees the new bundle.
pub struct BoundCommand<C> {
    name: Arc<str>,
    command: Command<C>,
    store: Arc<dyn DependencyStore<C>>,
}

impl<C> BoundCommand<C> {
    /// The name the command was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if calls yield pending replies.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.command.is_async()
    }

    /// Invoke the command with the current dependencies.
    pub fn call(&self, args: Value) -> Reply<Value> {
        tracing::trace!(command = %self.name, "Invoking command");
        self.command.invoke(&self.name, self.store.get(), args)
    }
}

impl<C> Clone for BoundCommand<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            command: self.command.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<C> fmt::Debug for BoundCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCommand")
            .field("name", &self.name)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

struct Inner<C> {
    id: Uuid,
    kind: String,
    store: Arc<dyn DependencyStore<C>>,
    controller: LifecycleController<C>,
    commands: BTreeMap<String, BoundCommand<C>>,
}

/// A wrapped client exposing its commands and lifecycle operations.
///
/// Cloning a facade is cheap; clones share the same store and state.
/// Built through [`Definition`](crate::Definition).
pub struct Facade<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Facade<C>
where
    C: Send + Sync + 'static,
{
    pub(crate) fn assemble(
        kind: String,
        store: Arc<dyn DependencyStore<C>>,
        commands: BTreeMap<String, Command<C>>,
        on_close: Option<CloseFn<C>>,
        health_check: Option<HealthCheck<C>>,
    ) -> Self {
        let commands = commands
            .into_iter()
            .map(|(name, command)| {
                let bound = BoundCommand {
                    name: Arc::from(name.as_str()),
                    command,
                    store: Arc::clone(&store),
                };
                (name, bound)
            })
            .collect();
        let controller = LifecycleController::new(Arc::clone(&store), on_close, health_check);

        let id = Uuid::new_v4();
        tracing::debug!(facade_id = %id, kind = %kind, "Facade created");

        Self {
            inner: Arc::new(Inner {
                id,
                kind,
                store,
                controller,
                commands,
            }),
        }
    }

    /// Unique id of this facade, for log correlation.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The type label given at construction.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.inner.kind
    }

    /// The current dependency bundle.
    #[must_use]
    pub fn dependencies(&self) -> Arc<Dependencies<C>> {
        self.inner.store.get()
    }

    /// Replace the dependencies wholesale.
    ///
    /// The lifecycle status is kept. Passing the spec of the current bundle
    /// (see [`Dependencies::to_spec`]) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if `deps` is `None`, has no
    /// client, or carries a reserved key. The current bundle is kept.
    pub fn set_dependencies(&self, deps: impl Into<Option<DependencySpec<C>>>) -> Result<()> {
        self.inner.store.set(deps.into())?;
        Ok(())
    }

    /// Shallow-merge a patch into the dependencies.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if the patch carries a reserved key.
    pub fn update_dependencies(&self, patch: DependencyPatch<C>) -> Result<()> {
        self.inner.store.update(patch)?;
        Ok(())
    }

    /// The current client.
    #[must_use]
    pub fn client(&self) -> Arc<C> {
        self.inner.store.client()
    }

    /// Swap the client, keeping the other dependencies.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if `client` is `None`.
    pub fn set_client(&self, client: impl Into<Option<Arc<C>>>) -> Result<()> {
        self.inner.store.set_client(client.into())?;
        Ok(())
    }

    /// Names of the registered commands, in sorted order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.inner.commands.keys().map(String::as_str)
    }

    /// Returns true if a command is registered under `name`.
    #[must_use]
    pub fn has_command(&self, name: &str) -> bool {
        self.inner.commands.contains_key(name)
    }

    /// Get a bound command by name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<BoundCommand<C>> {
        self.inner.commands.get(name).cloned()
    }

    /// Invoke a command by name.
    ///
    /// The reply is a `ControlError::UnknownCommand` if nothing is
    /// registered under `name`.
    pub fn call(&self, name: &str, args: Value) -> Reply<Value> {
        match self.inner.commands.get(name) {
            Some(command) => command.call(args),
            None => Reply::Ready(Err(ControlError::UnknownCommand(name.to_owned()))),
        }
    }

    /// Attach this facade's lifecycle to an arbitrary base value.
    #[must_use]
    pub fn decorate<B>(&self, base: B) -> Managed<B, C> {
        Managed::new(base, self.clone())
    }
}

impl<C> Lifecycle for Facade<C>
where
    C: Send + Sync + 'static,
{
    fn status(&self) -> Status {
        self.inner.controller.status()
    }

    fn close(&self, options: CloseOptions) -> Reply<()> {
        tracing::debug!(
            facade_id = %self.inner.id,
            kind = %self.inner.kind,
            delay = ?options.delay,
            "Close requested"
        );
        self.inner.controller.close(options)
    }

    fn is_healthy(&self) -> Reply<bool> {
        self.inner.controller.is_healthy()
    }
}

impl<C> Clone for Facade<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for Facade<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("status", &self.inner.store.get().status())
            .field("commands", &self.inner.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::callable::Callable;
    use crate::definition::Definition;

    #[derive(Debug)]
    struct Conn {
        name: &'static str,
    }

    fn facade() -> Facade<Conn> {
        Definition::new()
            .kind("test")
            .dependencies(DependencySpec::new().client(Conn { name: "primary" }))
            .command("echo", Callable::sync(|_deps, args| Ok(args)))
            .command(
                "whoami",
                Callable::sync(|deps: Arc<Dependencies<Conn>>, _args| {
                    Ok(json!({ "client": deps.client().name, "status": deps.status() }))
                }),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn exposes_type_label_and_commands() {
        let facade = facade();
        assert_eq!(facade.kind(), "test");
        assert_eq!(facade.command_names().collect::<Vec<_>>(), vec!["echo", "whoami"]);
        assert!(facade.has_command("echo"));
        assert!(!facade.has_command("close"));
    }

    #[test]
    fn unknown_command() {
        let result = facade().call("drop_table", Value::Null).try_ready().unwrap();
        assert!(matches!(result, Err(ControlError::UnknownCommand(name)) if name == "drop_table"));
    }

    #[test]
    fn bound_command_sees_client_swap() {
        let facade = facade();
        let whoami = facade.command("whoami").unwrap();

        facade
            .set_client(Arc::new(Conn { name: "replica" }))
            .unwrap();

        let result = whoami.call(Value::Null).try_ready().unwrap().unwrap();
        assert_eq!(result["client"], "replica");
    }

    #[test]
    fn commands_see_status_after_close() {
        let facade = facade();
        assert!(facade.close(CloseOptions::new()).try_ready().unwrap().is_ok());

        let result = facade.call("whoami", Value::Null).try_ready().unwrap().unwrap();
        assert_eq!(result["status"], "CLOSED");
    }

    #[test]
    fn set_dependencies_none_is_invalid_argument() {
        let facade = facade();
        let err = facade.set_dependencies(None).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn set_client_none_is_invalid_argument() {
        let facade = facade();
        let err = facade.set_client(None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(facade.client().name, "primary");
    }

    #[test]
    fn clones_share_state() {
        let facade = facade();
        let clone = facade.clone();
        assert_eq!(facade.id(), clone.id());

        let _ = clone.close(CloseOptions::new()).try_ready();
        assert_eq!(facade.status(), Status::Closed);
    }
}
