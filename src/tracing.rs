use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

/// Installs the global subscriber. `log` records are forwarded into it, so the
/// rest of the crate logs through the `log` macros.
///
/// With a log file, lines go to stderr and are appended to the file through a
/// non-blocking writer; keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (writer, guard) = match log_file.and_then(open_appender) {
        Some((file_writer, guard)) => (
            BoxMakeWriter::new(std::io::stderr.and(file_writer)),
            Some(guard),
        ),
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();

    guard
}

fn open_appender(
    path: &Path,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("cannot create log directory {}: {err}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
