use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber; `RUST_LOG` overrides the `info` default
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A host that already installed a subscriber keeps it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
