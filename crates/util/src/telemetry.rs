//! Tracing bootstrap for binaries and tests embedding the search client.

/// Install a formatted subscriber filtered by `RUST_LOG`, defaulting to
/// `default_filter` (for example `"info"` or `"duo_search_api=debug"`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        init_tracing("debug");
        assert!(!init_tracing("debug"));
    }
}
