use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Client libraries are noisy at INFO; keep them at WARN unless `RUST_LOG`
/// says otherwise.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "tungstenite=warn"];

fn env_filter() -> EnvFilter {
    QUIET_TARGETS.iter().fold(
        EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        |filter, target| match target.parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        },
    )
}

/// Initialize the tracing subscriber.
/// Uses JSON format when `RUST_LOG_FORMAT=json` (the default).
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing() {
    let use_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(true);

    let installed = if use_json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .with(env_filter())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter())
            .try_init()
    };

    if let Err(e) = installed {
        eprintln!("Tracing subscriber not installed: {e}");
    }
}
