//! Tracing initialisation.
//!
//! Level comes from `RUST_LOG` when set, otherwise from WHORF_LOG_LEVEL /
//! LOG_LEVEL (see `whorf_core::config::ObservabilityConfig`). WHORF_LOG_JSON=1
//! switches to one JSON object per line for log collectors.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use whorf_core::config::ObservabilityConfig;

fn filter(cfg: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level))
}

/// Install the global subscriber. Call once at startup.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let json = cfg.log_json.then(|| fmt::layer().json().with_target(true));
    let plain = (!cfg.log_json).then(|| fmt::layer().with_target(true));

    let installed = tracing_subscriber::registry()
        .with(filter(cfg))
        .with(json)
        .with(plain)
        .try_init();

    match installed {
        Ok(()) => tracing::debug!(
            level = %cfg.log_level,
            json = cfg.log_json,
            "tracing initialised"
        ),
        // No subscriber of ours is active, so stderr is the only channel left.
        Err(e) => eprintln!("whorf: tracing subscriber not installed: {e}"),
    }
}
