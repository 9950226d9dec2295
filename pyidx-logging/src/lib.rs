//! Tracing subscriber setup for the `pyidx` binary.
//!
//! Library crates only emit `tracing` events; this crate decides where they
//! go. Console output always goes to stderr so stdout stays free for command
//! output such as rendered indexes.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Environment variable consulted for the filter when no level is given.
pub const LOG_ENV: &str = "PYIDX_LOG";

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected human or json)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Filter directive, e.g. `debug` or `pyidx=debug,reqwest=warn`
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
    /// Also write to a daily-rolling file at this path
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// The filter directive that will be applied: explicit level, then
    /// `PYIDX_LOG`, then `RUST_LOG`, then `info`.
    pub fn directive(&self) -> String {
        self.level
            .clone()
            .or_else(|| env::var(LOG_ENV).ok())
            .or_else(|| env::var("RUST_LOG").ok())
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_new(self.directive()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
        for quiet in ["hyper=warn", "hyper_util=warn", "rustls=warn"] {
            if let Ok(directive) = quiet.parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
}

fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi).with_target(false);
    match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Install the global subscriber.
///
/// Returns the guard that flushes the file writer; keep it alive until exit.
/// A second call is a no-op.
pub fn init_subscriber(settings: &LogSettings) -> Option<WorkerGuard> {
    let mut layers = vec![format_layer(settings.format, std::io::stderr, true)];
    let mut guard = None;

    if let Some(file) = &settings.file {
        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        let name = file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pyidx.log"));
        let appender = tracing_appender::rolling::daily(dir, name);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        layers.push(format_layer(settings.format, writer, false));
    }

    let _ = registry()
        .with(layers)
        .with(settings.env_filter())
        .try_init();

    guard
}
