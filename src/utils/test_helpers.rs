use std::sync::Once;

static TEST_SUBSCRIBER: Once = Once::new();

/// Installs a test-writer `tracing` subscriber for the current test binary.
///
/// Safe to call from every test; only the first call installs anything. The
/// level comes from `RUST_LOG`. Tests that inspect log lines with
/// `#[traced_test]` bring their own subscriber and skip this.
pub fn setup_test_logging() {
    TEST_SUBSCRIBER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `true` when tests run with UID 0, where read-only destinations are still
/// writable and permission failures cannot be provoked. Shared by the unit and
/// the integration tests.
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    // SAFETY: geteuid only reads the effective user id.
    let root = unsafe { libc::geteuid() } == 0;
    #[cfg(not(unix))]
    let root = false;
    root
}
