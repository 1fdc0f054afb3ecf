//! Tracing setup shared by the `inscroll` binary and the test suites.
//!
//! Every run writes a log file. The file records `warn` and up unless a filter
//! is configured through the environment, in which case both the file and
//! stderr use it. Debug builds always echo to stderr. Stdout belongs to the
//! replay output and is never written here.
//!
//! Filters are read from `INSCROLL_LOG` first, then `RUST_LOG`. A bare level
//! in `INSCROLL_LOG` such as `debug` applies to the inscroll crates only.
//!
//! The log file is the path given with `--log-file` or `INSCROLL_LOG_FILE`,
//! else `<data_local_dir>/inscroll/logs/inscroll-<pid>.log`.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const LOG_FILE_VAR: &str = "INSCROLL_LOG_FILE";

/// Hold for the lifetime of the program. Dropping it flushes the log file.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Where the active filter came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterSource {
    Inscroll(String),
    Rust(String),
    Unset,
}

impl FilterSource {
    fn from_env() -> Self {
        if let Ok(value) = env::var("INSCROLL_LOG") {
            Self::Inscroll(value)
        } else if let Ok(value) = env::var("RUST_LOG") {
            Self::Rust(value)
        } else {
            Self::Unset
        }
    }

    fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    fn directives(&self) -> String {
        match self {
            Self::Inscroll(value) => scoped(value),
            Self::Rust(value) => value.clone(),
            Self::Unset => scoped("info"),
        }
    }

    fn filter(&self) -> Result<EnvFilter, BoxError> {
        Ok(EnvFilter::try_new(self.directives())?)
    }

    /// The file gets `warn` unless a filter was asked for.
    fn file_filter(&self) -> Result<EnvFilter, BoxError> {
        if self.is_set() {
            self.filter()
        } else {
            Ok(EnvFilter::new("warn"))
        }
    }
}

/// Turns a bare level into `warn` plus that level for the inscroll crates.
/// Full directive strings are returned unchanged.
fn scoped(level: &str) -> String {
    if level.contains(['=', ':', ',']) {
        return level.to_string();
    }
    ["inscroll", "inscroll_bin", "inscroll_log"]
        .iter()
        .fold(String::from("warn"), |acc, krate| {
            format!("{acc},{krate}={level}")
        })
}

fn log_file_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var_os(LOG_FILE_VAR).map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("inscroll")
                .join("logs")
                .join(format!("inscroll-{}.log", std::process::id()))
        })
}

/// Splits a log file path into the directory to create and the file name.
fn split_log_path(path: &Path) -> Result<(PathBuf, &Path), BoxError> {
    let name = path
        .file_name()
        .ok_or_else(|| format!("log file path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, Path::new(name)))
}

/// Installs the global subscriber.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let source = FilterSource::from_env();
    let log_file = log_file_path(config.log_file_path);
    let (dir, name) = split_log_path(&log_file)?;
    std::fs::create_dir_all(&dir)?;

    let (writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, name));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(source.file_filter()?);

    let stderr_layer = (source.is_set() || cfg!(debug_assertions))
        .then(|| source.filter())
        .transpose()?
        .map(|filter| fmt::layer().with_writer(std::io::stderr).with_filter(filter));

    Registry::default()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::debug!(log_file = %log_file.display(), "Logging initialized");
    Ok(LogGuard {
        _file_guard: file_guard,
        log_file,
    })
}

/// Test logging: stderr through the test writer. Repeated calls are no-ops.
pub fn test() {
    if let Ok(filter) = FilterSource::from_env().filter() {
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}
