//! Logging setup and operator notices
//!
//! Events go to stderr and to a log file through `tracing-subscriber`;
//! verbosity follows `RUST_LOG` and defaults to `info`.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggerConfig;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the global subscriber with a stderr layer and a file layer.
///
/// The parent directory of `log_path` is created when missing.
pub fn init_logging(log_path: &Path) -> Result<LoggingGuard, io::Error> {
    let log_dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(log_dir)?;

    let log_file = log_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_file.to_string_lossy().into_owned())
        .build(log_dir)
        .map_err(io::Error::other)?;
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Operator-facing notices gated by [`LoggerConfig`]
///
/// Diagnostic notices need `DevLogger`, success notices need `SuccessLogger`.
/// Warnings and errors are never suppressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Notices {
    flags: LoggerConfig,
}

impl Notices {
    pub fn new(flags: LoggerConfig) -> Self {
        Self { flags }
    }

    pub fn diagnostic(&self, message: fmt::Arguments<'_>) {
        if self.flags.dev_logger {
            info!("{}", message);
        }
    }

    pub fn success(&self, message: fmt::Arguments<'_>) {
        if self.flags.success_logger {
            info!(outcome = "success", "{}", message);
        }
    }

    pub fn warning(&self, message: fmt::Arguments<'_>) {
        warn!("{}", message);
    }

    pub fn error(&self, message: fmt::Arguments<'_>) {
        error!("{}", message);
    }
}

/// In-memory log sink for asserting on emitted notices
#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Route events on the current thread here until the guard drops
        pub(crate) fn install(&self) -> DefaultGuard {
            let subscriber = tracing_subscriber::fmt()
                .with_writer(self.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        pub(crate) fn count(&self, needle: &str) -> usize {
            self.contents().matches(needle).count()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}
