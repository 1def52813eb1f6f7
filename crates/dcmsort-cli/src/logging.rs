use std::env;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stdout plus a plain-text log file. Keep the returned guard alive until exit so the
/// file writer flushes.
pub fn init_logger(verbose: bool) -> impl Drop {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| default_level.to_string());

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/dcmsort.log".to_string());
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never("./", log_file_path));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .pretty()
        .with_file(false)
        .with_target(false)
        .without_time()
        .with_ansi(true);
    let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(EnvFilter::new(filter))
        .init();

    debug!("Logging to stdout and file");

    guard
}
