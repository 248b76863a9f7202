/// Configure tracing once at startup for the whole process.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Output goes
/// to stderr so it does not interleave with the terminal screens on stdout.
pub fn setup_tracing(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
