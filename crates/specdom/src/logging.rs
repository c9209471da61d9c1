//! Subscriber setup for hosts that want the engine's diagnostics.
//!
//! The engine itself only emits `tracing` events. Installing a subscriber
//! is left to the host; this module offers the usual fmt subscriber.

use crate::result::{SpecdomError, SpecdomResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "SPECDOM_LOG";

/// Filter used when neither the argument nor the environment sets one
pub const DEFAULT_FILTER: &str = "warn";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn build_filter(filter: Option<&str>) -> SpecdomResult<EnvFilter> {
    match filter {
        Some(directive) => EnvFilter::try_new(directive).map_err(|err| SpecdomError::Config {
            message: format!("invalid log filter {directive:?}: {err}"),
        }),
        None => Ok(EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install a global fmt subscriber.
///
/// `filter` overrides `SPECDOM_LOG`. Returns `Ok(false)` when a global
/// subscriber was already installed.
///
/// # Errors
///
/// Returns an error if `filter` is not a valid directive.
pub fn init_tracing(filter: Option<&str>, format: LogFormat) -> SpecdomResult<bool> {
    let env_filter = build_filter(filter)?;
    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    Ok(installed.is_ok())
}
