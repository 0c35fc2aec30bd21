use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging.
/// - JSON logs by default, plain text with SOLEIL_LOG_FORMAT=pretty
/// - RUST_LOG respected; default to "info,soleil=debug"
/// - Written to stderr, stdout stays free for command output
pub fn init(service_name: &str) {
    let default_filter = "info,soleil=debug";
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let pretty = std::env::var("SOLEIL_LOG_FORMAT").is_ok_and(|f| f == "pretty");

    let registry = tracing_subscriber::registry().with(EnvFilter::new(env_filter));
    if pretty {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!(service = %service_name, "Logging initialized");
}
