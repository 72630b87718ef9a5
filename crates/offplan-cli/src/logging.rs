use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` turns on engine debug
/// output and the default only shows errors.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "error" };
    let default_filter = format!("offplan={level},offplan_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_target(true),
        )
        .try_init();
}
