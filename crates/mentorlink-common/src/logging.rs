//! ---
//! ml_section: "01-core-functionality"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Shared configuration and tracing bootstrap."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "MENTORLINK_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Flush handles for the non-blocking writers; held for the process lifetime.
struct WriterGuards {
    _file: WorkerGuard,
    _console: WorkerGuard,
}

static GUARDS: OnceCell<WriterGuards> = OnceCell::new();

/// Console format. The rolling file is always JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Filter directive in effect: `MENTORLINK_LOG`, then `RUST_LOG`, then `info`.
/// Blank variables are skipped.
pub fn filter_directive() -> String {
    [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_owned())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!("ignoring log directive `{directive}` ({err}); using {DEFAULT_DIRECTIVE}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

/// Name of the daily rolling file for `service_name`.
///
/// The prefix is dropped when it would only repeat the service name.
pub fn log_file_name(service_name: &str, config: &LoggingConfig) -> String {
    match config.file_prefix.as_deref() {
        Some(prefix) if prefix != service_name => format!("{prefix}-{service_name}.log"),
        _ => format!("{service_name}.log"),
    }
}

/// Install the global subscriber: console output on stderr, JSON to a daily
/// rolling file under `config.directory`.
///
/// Stdout is left to command output. Returns `false` when a subscriber was
/// already installed, in which case nothing changes.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<bool> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!("unable to create log directory {}", config.directory.display())
    })?;

    let file_name = log_file_name(service_name, config);
    let (file_writer, file_guard) =
        tracing_appender::non_blocking(daily(&config.directory, &file_name));
    let (console_writer, console_guard) = tracing_appender::non_blocking(std::io::stderr());

    let console_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(console_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(console_writer)
            .boxed(),
    };
    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(file_writer)
        .boxed();

    let installed = tracing_subscriber::registry()
        .with(build_filter(&filter_directive()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();
    if !installed {
        return Ok(false);
    }

    let _ = GUARDS.set(WriterGuards {
        _file: file_guard,
        _console: console_guard,
    });
    info!(service = %service_name, log_file = %config.directory.join(&file_name).display(), "tracing initialised");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config(prefix: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            directory: PathBuf::from("logs"),
            format: LogFormat::Pretty,
            file_prefix: prefix.map(str::to_owned),
        }
    }

    #[test]
    fn file_name_avoids_repeating_the_service() {
        assert_eq!(log_file_name("mentorlinkctl", &config(None)), "mentorlinkctl.log");
        assert_eq!(
            log_file_name("mentorlinkctl", &config(Some("mentorlinkctl"))),
            "mentorlinkctl.log"
        );
        assert_eq!(
            log_file_name("mentorlinkctl", &config(Some("audit"))),
            "audit-mentorlinkctl.log"
        );
    }

    #[test]
    fn invalid_directive_falls_back() {
        let fallback = EnvFilter::new(DEFAULT_DIRECTIVE).to_string();
        assert_eq!(build_filter("mentorlink=loudest").to_string(), fallback);
        assert_ne!(build_filter("debug").to_string(), fallback);
    }

    #[test]
    fn init_creates_log_directory() {
        let dir = tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().join("logs"),
            format: LogFormat::Pretty,
            file_prefix: Some("test".into()),
        };
        init_tracing("mentorlink-common", &config).unwrap();
        assert!(config.directory.is_dir());
        // A second install is a no-op.
        assert!(!init_tracing("mentorlink-common", &config).unwrap());
    }
}
