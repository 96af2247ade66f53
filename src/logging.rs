use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Keeps the non-blocking file writer alive; drop it only on shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber: a stdout layer always, plus a daily
/// rolling file layer when the configuration asks for one.
pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    if config.file_logs_enabled {
        if let Err(err) = std::fs::create_dir_all(&config.dir) {
            eprintln!(
                "failed to create log directory {}: {}",
                config.dir.display(),
                err
            );
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.dir, "deck.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            return Some(FileLogGuard { _guard: guard });
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
