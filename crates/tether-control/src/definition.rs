//! Facade definitions and their validation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tether_core::{Dependencies, DependencySpec, Status};
use tether_store::{DependencyStore, SharedStore};

use crate::callable::{CloseFn, Command, HealthCheck};
use crate::error::{ControlError, Result};
use crate::facade::Facade;
use crate::lifecycle::LIFECYCLE_OPERATIONS;

/// Everything needed to build a [`Facade`].
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use tether_control::{Callable, Definition, Dependencies, DependencySpec, Lifecycle, Status};
///
/// let facade = Definition::new()
///     .kind("kv")
///     .dependencies(DependencySpec::new().client(std::collections::HashMap::<String, String>::new()))
///     .command("size", Callable::sync(|deps: Arc<Dependencies<HashMap<String, String>>>, _args| Ok(deps.client().len().into())))
///     .build()
///     .unwrap();
///
/// assert_eq!(facade.status(), Status::Open);
/// ```
pub struct Definition<C> {
    kind: Option<String>,
    dependencies: Option<DependencySpec<C>>,
    commands: Option<BTreeMap<String, Command<C>>>,
    on_close: Option<CloseFn<C>>,
    health_check: Option<HealthCheck<C>>,
}

impl<C> Definition<C> {
    /// Start an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: None,
            dependencies: None,
            commands: None,
            on_close: None,
            health_check: None,
        }
    }

    /// Set the type label of the facade (e.g. `"postgres"`).
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set the initial dependencies.
    #[must_use]
    pub fn dependencies(mut self, dependencies: DependencySpec<C>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Set the whole command dictionary, replacing any registered commands.
    #[must_use]
    pub fn commands<I, N>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = (N, Command<C>)>,
        N: Into<String>,
    {
        self.commands = Some(
            commands
                .into_iter()
                .map(|(name, command)| (name.into(), command))
                .collect(),
        );
        self
    }

    /// Register one command.
    #[must_use]
    pub fn command(mut self, name: impl Into<String>, command: Command<C>) -> Self {
        self.commands
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), command);
        self
    }

    /// Set the close override.
    #[must_use]
    pub fn on_close(mut self, on_close: CloseFn<C>) -> Self {
        self.on_close = Some(on_close);
        self
    }

    /// Set the health check override.
    #[must_use]
    pub fn health_check(mut self, health_check: HealthCheck<C>) -> Self {
        self.health_check = Some(health_check);
        self
    }

    /// Check the definition without building anything.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidDefinition` if the type label is missing
    /// or blank, the dependencies are missing or invalid, the command
    /// dictionary was never supplied, or a command name is empty or collides
    /// with a lifecycle operation.
    pub fn validate(&self) -> Result<()> {
        if self.kind.as_deref().map_or(true, |kind| kind.trim().is_empty()) {
            return Err(invalid("type label is required"));
        }

        let dependencies = self
            .dependencies
            .as_ref()
            .ok_or_else(|| invalid("dependencies are required"))?;
        dependencies
            .validate()
            .map_err(|err| invalid(format!("dependencies: {err}")))?;

        let commands = self
            .commands
            .as_ref()
            .ok_or_else(|| invalid("commands are required"))?;
        for name in commands.keys() {
            if name.is_empty() {
                return Err(invalid("command names must not be empty"));
            }
            if LIFECYCLE_OPERATIONS.contains(&name.as_str()) {
                return Err(invalid(format!(
                    "command `{name}` collides with a lifecycle operation"
                )));
            }
        }

        Ok(())
    }
}

impl<C> Definition<C>
where
    C: Send + Sync + 'static,
{
    /// Validate and build a facade backed by a [`SharedStore`].
    ///
    /// # Errors
    ///
    /// See [`Definition::validate`].
    pub fn build(self) -> Result<Facade<C>> {
        self.build_with_store(SharedStore::new)
    }

    /// Validate and build a facade backed by a custom store.
    ///
    /// `make_store` receives the validated, `OPEN` bundle to seed the store with.
    ///
    /// # Errors
    ///
    /// See [`Definition::validate`].
    pub fn build_with_store<S, F>(self, make_store: F) -> Result<Facade<C>>
    where
        S: DependencyStore<C> + 'static,
        F: FnOnce(Dependencies<C>) -> S,
    {
        self.validate()?;

        let (Some(kind), Some(dependencies), Some(commands)) =
            (self.kind, self.dependencies, self.commands)
        else {
            return Err(invalid("definition is incomplete"));
        };
        let dependencies = dependencies
            .into_dependencies(Status::Open)
            .map_err(|err| invalid(format!("dependencies: {err}")))?;

        let store: Arc<dyn DependencyStore<C>> = Arc::new(make_store(dependencies));
        Ok(Facade::assemble(
            kind,
            store,
            commands,
            self.on_close,
            self.health_check,
        ))
    }
}

fn invalid(reason: impl Into<String>) -> ControlError {
    ControlError::InvalidDefinition(reason.into())
}

impl<C> Default for Definition<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Definition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies)
            .field(
                "commands",
                &self.commands.as_ref().map(|c| c.keys().collect::<Vec<_>>()),
            )
            .field("on_close", &self.on_close)
            .field("health_check", &self.health_check)
            .finish()
    }
}
