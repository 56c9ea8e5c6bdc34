//! The upstream HTTP client and the facade built around it.
//!
//! ```text
//!   Facade<Upstream>
//!     ├── ping        (async)  GET {upstream}{health_path}
//!     ├── describe    (sync)   upstream URL, type label, status
//!     ├── is_healthy  (async)  healthy on 2xx
//!     └── close       (async)  waits out the drain window
//! ```

use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use tether_control::{
    Callable, CloseFn, CloseOptions, Command, Definition, Dependencies, DependencySpec, Facade,
    HealthCheck,
};

use crate::config::ProbeConfig;

/// Type label of facades built by [`build_facade`].
pub const KIND: &str = "http-upstream";

/// Extra holding the full health URL.
pub const HEALTH_URL_KEY: &str = "health_url";

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    /// Create an upstream client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(client, config.upstream_url.clone()))
    }

    /// Create an upstream client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Get the base URL of the upstream service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url` and return the response status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails before a response arrives.
    pub async fn probe(&self, url: &str) -> reqwest::Result<reqwest::StatusCode> {
        let response = self.client.get(url).send().await?;
        Ok(response.status())
    }
}

/// Build a facade around `upstream`.
///
/// # Errors
///
/// Returns an error if the facade definition is rejected.
pub fn build_facade(
    upstream: Upstream,
    config: &ProbeConfig,
) -> tether_control::Result<Facade<Upstream>> {
    Definition::new()
        .kind(KIND)
        .dependencies(
            DependencySpec::new()
                .client(upstream)
                .extra(HEALTH_URL_KEY, config.health_url()),
        )
        .command("ping", ping())
        .command("describe", describe())
        .health_check(health_check())
        .on_close(drain())
        .build()
}

fn health_url(deps: &Dependencies<Upstream>) -> String {
    deps.get::<String>(HEALTH_URL_KEY)
        .cloned()
        .unwrap_or_else(|| deps.client().base_url().to_string())
}

fn ping() -> Command<Upstream> {
    Callable::future(|deps, _args| ping_upstream(deps))
}

async fn ping_upstream(deps: Arc<Dependencies<Upstream>>) -> anyhow::Result<Value> {
    let url = health_url(&deps);
    let status = deps
        .client()
        .probe(&url)
        .await
        .with_context(|| format!("GET {url}"))?;

    Ok(json!({ "status": status.as_u16(), "ok": status.is_success() }))
}

fn describe() -> Command<Upstream> {
    Callable::sync(|deps: Arc<Dependencies<Upstream>>, _args: Value| {
        Ok(json!({
            "kind": KIND,
            "upstream": deps.client().base_url(),
            "health_url": health_url(&deps),
            "status": deps.status(),
        }))
    })
}

fn health_check() -> HealthCheck<Upstream> {
    Callable::future(|deps, ()| upstream_healthy(deps))
}

async fn upstream_healthy(deps: Arc<Dependencies<Upstream>>) -> anyhow::Result<bool> {
    let url = health_url(&deps);
    match deps.client().probe(&url).await {
        Ok(status) => Ok(status.is_success()),
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "Upstream health request failed");
            Ok(false)
        }
    }
}

fn drain() -> CloseFn<Upstream> {
    Callable::future(|deps, options| wait_out_drain(deps, options))
}

async fn wait_out_drain(
    deps: Arc<Dependencies<Upstream>>,
    options: CloseOptions,
) -> anyhow::Result<()> {
    let delay = options.delay_or_zero();
    tracing::info!(
        upstream = %deps.client().base_url(),
        delay = ?delay,
        "Draining upstream"
    );
    tokio::time::sleep(delay).await;
    tracing::info!(upstream = %deps.client().base_url(), "Upstream released");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tether_control::{Lifecycle, Status};

    use super::*;

    fn facade() -> Facade<Upstream> {
        let config = ProbeConfig {
            upstream_url: "http://upstream.invalid:1".to_string(),
            ..ProbeConfig::default()
        };
        build_facade(Upstream::new(&config).unwrap(), &config).unwrap()
    }

    #[test]
    fn registers_commands_and_overrides() {
        let facade = facade();
        assert_eq!(facade.kind(), KIND);
        assert_eq!(
            facade.command_names().collect::<Vec<_>>(),
            vec!["describe", "ping"]
        );
        assert!(facade.command("ping").unwrap().is_async());
        assert!(!facade.command("describe").unwrap().is_async());
    }

    #[test]
    fn describe_is_synchronous() {
        let result = facade()
            .call("describe", Value::Null)
            .try_ready()
            .unwrap()
            .unwrap();

        assert_eq!(result["kind"], KIND);
        assert_eq!(result["upstream"], "http://upstream.invalid:1");
        assert_eq!(result["health_url"], "http://upstream.invalid:1/health");
        assert_eq!(result["status"], "OPEN");
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_the_delay() {
        let facade = facade();
        let started = tokio::time::Instant::now();

        facade
            .close(CloseOptions::with_delay(std::time::Duration::from_secs(3)))
            .await
            .unwrap();

        assert!(started.elapsed() >= std::time::Duration::from_secs(3));
        assert_eq!(facade.status(), Status::Closed);
    }
}
