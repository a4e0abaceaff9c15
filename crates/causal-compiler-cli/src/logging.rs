// crates/causal-compiler-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: tracing-subscriber setup for the causal compiler CLI.
// Purpose: Resolve the log filter and install a single fmt subscriber.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! The CLI installs one `tracing_subscriber::fmt` subscriber per process.
//! The filter directive is chosen in this order: `--log-level`, the config
//! `[log] level`, the `CAUSAL_COMPILER_LOG` environment variable, then a
//! default of `warn` (`info` when logging to a file). Output goes to stderr,
//! or to an append-only log file without ANSI colours.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding a tracing env-filter directive.
pub const LOG_ENV_VAR: &str = "CAUSAL_COMPILER_LOG";
/// Default directive when logging to stderr.
pub const DEFAULT_LEVEL: &str = "warn";
/// Default directive when logging to a file.
pub const DEFAULT_FILE_LEVEL: &str = "info";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Logging inputs gathered from flags, config, and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Level from `--log-level`.
    pub cli_level: Option<String>,
    /// Level from the config `[log]` section.
    pub config_level: Option<String>,
    /// Directive from [`LOG_ENV_VAR`].
    pub env_directive: Option<String>,
    /// Log file path; stderr when absent.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Returns the filter directive that wins for these settings.
    #[must_use]
    pub fn directive(&self) -> &str {
        self.cli_level
            .as_deref()
            .or(self.config_level.as_deref())
            .or_else(|| self.env_directive.as_deref().filter(|value| !value.trim().is_empty()))
            .unwrap_or(if self.file.is_some() { DEFAULT_FILE_LEVEL } else { DEFAULT_LEVEL })
    }
}

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter {directive}: {error}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        error: String,
    },
    /// The log file could not be opened.
    #[error("unable to open log file {path}: {error}")]
    OpenFile {
        /// Log file path.
        path: String,
        /// I/O error message.
        error: String,
    },
    /// A global subscriber was already installed.
    #[error("subscriber already installed: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Initialisation
// ============================================================================

/// Builds the env filter for `settings`.
///
/// # Errors
/// Returns [`LoggingError::InvalidFilter`] when the directive is malformed.
pub fn build_filter(settings: &LogSettings) -> Result<EnvFilter, LoggingError> {
    let directive = settings.directive();
    EnvFilter::try_new(directive).map_err(|err| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        error: err.to_string(),
    })
}

/// Installs the global fmt subscriber.
///
/// # Errors
/// Returns [`LoggingError`] when the filter is invalid, the log file cannot
/// be opened, or a subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
                LoggingError::OpenFile {
                    path: path.display().to_string(),
                    error: err.to_string(),
                }
            })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}
