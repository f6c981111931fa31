//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter for a verbosity count (`-v` repetitions in a host CLI).
///
/// `RUST_LOG`, when set, takes precedence.
pub fn verbosity_filter(verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Install a formatted subscriber writing to stderr.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(verbosity: u8) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_tracing(0);
        assert!(!init_tracing(2));
    }
}
