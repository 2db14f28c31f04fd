//! Tracing subscriber setup

use crate::runner::Verbosity;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Silent => "stagehand=off",
        Verbosity::Quiet => "stagehand=error",
        Verbosity::Normal => "stagehand=info",
        Verbosity::Verbose => "stagehand=debug",
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the level picked from the verbosity flags.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(Verbosity::Silent), "stagehand=off");
        assert_eq!(default_directive(Verbosity::Verbose), "stagehand=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(Verbosity::Quiet);
        init_tracing(Verbosity::Verbose);
    }
}
