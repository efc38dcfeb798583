//! Tracing setup: structured logging with an `EnvFilter`.

pub mod events;

use std::sync::Once;

use cascade_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding per-target log directives.
pub const LOG_ENV_VAR: &str = "CASCADE_LOG";

/// Initialize the tracing subscriber.
///
/// Reads `CASCADE_LOG` for per-target levels, e.g.
/// `CASCADE_LOG=cascade_causal=debug,cascade_learning=info`.
/// Falls back to `info` if unset or invalid. Idempotent.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter, false);
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), false);
}

/// Initialize tracing from the `[observability]` config section.
/// `CASCADE_LOG` still wins over the configured level when set.
pub fn init_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    install(filter, config.json);
}

fn install(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        // A host application may already own the global subscriber.
        let result = if json {
            registry
                .with(fmt::layer().json().with_target(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
        if result.is_err() {
            tracing::debug!("global tracing subscriber already installed");
        }
    });
}
