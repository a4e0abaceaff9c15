// crates/causal-compiler-cli/src/main.rs
// ============================================================================
// Module: Causal Compiler CLI Entry Point
// Description: Command dispatcher for compiling causal-language programs.
// Purpose: Generate, drift-check, and inspect the Python imitation scripts.
// Dependencies: clap, causal-codegen, causal-compiler-config, causal-lang,
//               serde_json, thiserror, tracing.
// ============================================================================

//! ## Overview
//! The causal compiler CLI reads a causal-language program and writes the
//! CO-PCT facility domain and the pyhop imitation script. It can also check
//! generated files for drift and dump the token stream or syntax tree. All
//! user-facing strings are routed through the message catalog. Security
//! posture: source files, templates, and config are untrusted and read with
//! hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use causal_codegen::CausalCompiler;
use causal_codegen::Target;
use causal_codegen::Templates;
use causal_compiler_cli::logging;
use causal_compiler_cli::logging::LOG_ENV_VAR;
use causal_compiler_cli::logging::LogSettings;
use causal_compiler_cli::t;
use causal_compiler_config::CompilerConfig;
use causal_compiler_config::OutputConfig;
use causal_compiler_config::TemplateConfig;
use causal_compiler_config::config_toml_example;
use causal_lang::ParseLimits;
use causal_lang::line_column;
use causal_lang::tokenize;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a generated script read back by `check`.
const MAX_GENERATED_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "causal-compiler", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to causal-compiler.toml or `CAUSAL_COMPILER_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log level (overrides the config file and `CAUSAL_COMPILER_LOG`).
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevelArg>,
    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the Python scripts for a causal program.
    Compile(CompileCommand),
    /// Regenerate the scripts and fail if the files on disk differ.
    Check(CompileCommand),
    /// Print the token stream of a causal program.
    Tokens(SourceArgs),
    /// Print the syntax tree of a causal program as JSON.
    Parse(SourceArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the resolved causal-compiler.toml.
    Validate,
    /// Print a canonical example causal-compiler.toml.
    Example,
}

/// Source selection shared by every subcommand.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Causal program file.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Inline causal program text.
    #[arg(long, value_name = "SOURCE")]
    text: Option<String>,
}

/// Arguments for `compile` and `check`.
#[derive(Args, Debug)]
struct CompileCommand {
    /// Program source.
    #[command(flatten)]
    source: SourceArgs,
    /// Output directory (overrides `[output] dir`).
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Scripts to generate.
    #[arg(long, value_enum, default_value_t = TargetArg::All)]
    target: TargetArg,
}

/// Target selection for `compile` and `check`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TargetArg {
    /// Both scripts.
    All,
    /// Facility domain only.
    Facility,
    /// Imitation script only.
    Imitation,
}

impl TargetArg {
    /// Returns the selected targets in generation order.
    const fn targets(self) -> &'static [Target] {
        match self {
            Self::All => &Target::ALL,
            Self::Facility => &[Target::Facility],
            Self::Imitation => &[Target::Imitation],
        }
    }
}

/// Log level accepted by `--log-level`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevelArg {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Progress messages.
    Info,
    /// Emitter internals.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevelArg {
    /// Returns the env-filter directive for this level.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Program text plus the label used in diagnostics.
struct Source {
    /// Display label (file path or `<text>`).
    label: String,
    /// Program text.
    text: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = CompilerConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let settings = LogSettings {
        cli_level: cli.log_level.map(|level| level.as_str().to_string()),
        config_level: config.log.level.clone(),
        env_directive: std::env::var(LOG_ENV_VAR).ok(),
        file: cli.log_file.clone().or_else(|| config.log.file.clone()),
    };
    logging::init(&settings)
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;
    debug!(directive = settings.directive(), "logging initialised");

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Compile(command) => command_compile(&command, &config),
        Commands::Check(command) => command_check(&command, &config),
        Commands::Tokens(source) => command_tokens(&source, &config),
        Commands::Parse(source) => command_parse(&source, &config),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Compile Commands
// ============================================================================

/// Executes the `compile` command.
///
/// Each target is generated and written independently; the exit code is a
/// failure when any target failed.
fn command_compile(command: &CompileCommand, config: &CompilerConfig) -> CliResult<ExitCode> {
    let source = read_source(&command.source, config.limits.parse_limits())?;
    let compiler = parse_source(&source, config.limits.parse_limits())?;
    let templates = load_templates(&config.templates)?;
    let out_dir = command.out_dir.clone().unwrap_or_else(|| config.output.dir.clone());
    fs::create_dir_all(&out_dir).map_err(|err| {
        CliError::new(t!("compile.out_dir_failed", path = out_dir.display(), error = err))
    })?;

    let mut failed = false;
    for &target in command.target.targets() {
        let path = out_dir.join(output_file_name(&config.output, target));
        let written = compiler
            .compile(target, &templates)
            .map_err(|err| diagnostic(&source, err.position(), &err))
            .and_then(|script| {
                write_atomic(&path, script.as_bytes()).map_err(|err| {
                    t!("compile.write_failed", path = path.display(), error = err)
                })
            });
        match written {
            Ok(()) => {
                info!(%target, path = %path.display(), "wrote script");
                write_stdout_line(&t!("compile.wrote", target = target, path = path.display()))
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
            Err(message) => {
                failed = true;
                warn!(%target, "target failed");
                write_stderr_line(&t!("compile.target_failed", target = target, error = message))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            }
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Executes the `check` command.
///
/// Regenerates each target and compares it byte-for-byte with the file on
/// disk. Missing files and generation errors count as drift.
fn command_check(command: &CompileCommand, config: &CompilerConfig) -> CliResult<ExitCode> {
    let source = read_source(&command.source, config.limits.parse_limits())?;
    let compiler = parse_source(&source, config.limits.parse_limits())?;
    let templates = load_templates(&config.templates)?;
    let out_dir = command.out_dir.clone().unwrap_or_else(|| config.output.dir.clone());

    let mut drift = false;
    for &target in command.target.targets() {
        let path = out_dir.join(output_file_name(&config.output, target));
        let script = match compiler.compile(target, &templates) {
            Ok(script) => script,
            Err(err) => {
                drift = true;
                let message = diagnostic(&source, err.position(), &err);
                write_stderr_line(&t!("compile.target_failed", target = target, error = message))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                continue;
            }
        };
        let status = match read_bytes_with_limit(&path, MAX_GENERATED_BYTES) {
            Ok(existing) if existing == script.as_bytes() => {
                t!("check.up_to_date", target = target, path = path.display())
            }
            Ok(_) => {
                drift = true;
                t!("check.drift", target = target, path = path.display())
            }
            Err(ReadLimitError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                drift = true;
                t!("check.missing", target = target, path = path.display())
            }
            Err(err) => {
                return Err(CliError::new(read_error_message(
                    err,
                    &t!("input.output_kind"),
                    &path,
                )));
            }
        };
        info!(%target, drift, "checked script");
        write_stdout_line(&status).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(if drift { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Returns the configured file name for `target`.
fn output_file_name(output: &OutputConfig, target: Target) -> &str {
    match target {
        Target::Facility => &output.facility_file,
        Target::Imitation => &output.imitation_file,
    }
}

/// Loads the built-in templates and applies config overrides.
fn load_templates(config: &TemplateConfig) -> CliResult<Templates> {
    let mut templates = Templates::builtin();
    if let Some(path) = &config.facility {
        templates = templates.with_facility_file(path).map_err(|err| {
            CliError::new(t!("template.load_failed", target = Target::Facility, error = err))
        })?;
    }
    if let Some(path) = &config.imitation {
        templates = templates.with_imitation_file(path).map_err(|err| {
            CliError::new(t!("template.load_failed", target = Target::Imitation, error = err))
        })?;
    }
    Ok(templates)
}

// ============================================================================
// SECTION: Inspection Commands
// ============================================================================

/// Executes the `tokens` command.
fn command_tokens(args: &SourceArgs, config: &CompilerConfig) -> CliResult<ExitCode> {
    let source = read_source(args, config.limits.parse_limits())?;
    let tokens = tokenize(&source.text)
        .map_err(|err| CliError::new(diagnostic(&source, err.position(), &err)))?;
    let mut output = String::new();
    for spanned in &tokens {
        output.push_str(&t!(
            "tokens.line",
            kind = spanned.token.kind(),
            value = spanned.token,
            position = spanned.position
        ));
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `parse` command.
fn command_parse(args: &SourceArgs, config: &CompilerConfig) -> CliResult<ExitCode> {
    let limits = config.limits.parse_limits();
    let source = read_source(args, limits)?;
    let compiler = parse_source(&source, limits)?;
    let json = serde_json::to_string_pretty(compiler.program())
        .map_err(|err| CliError::new(t!("parse.serialize_failed", error = err)))?;
    write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
///
/// The config has already been loaded and validated by [`run`], so
/// `validate` only reports success.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => write_stdout_line(&t!("config.validate.ok")),
        ConfigCommand::Example => write_stdout_bytes(config_toml_example().as_bytes()),
    }
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Source Helpers
// ============================================================================

/// Reads the program text selected by `args`.
fn read_source(args: &SourceArgs, limits: ParseLimits) -> CliResult<Source> {
    if let Some(text) = &args.text {
        if text.len() > limits.max_input_bytes {
            return Err(CliError::new(t!(
                "input.text_too_large",
                size = text.len(),
                limit = limits.max_input_bytes
            )));
        }
        return Ok(Source {
            label: t!("input.text_label"),
            text: text.clone(),
        });
    }
    let Some(path) = args.input.as_deref() else {
        return Err(CliError::new(t!("input.missing")));
    };
    let kind = t!("input.source_kind");
    let bytes = read_bytes_with_limit(path, limits.max_input_bytes)
        .map_err(|err| CliError::new(read_error_message(err, &kind, path)))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = path.display())))?;
    debug!(path = %path.display(), bytes = text.len(), "read causal program");
    Ok(Source {
        label: path.display().to_string(),
        text,
    })
}

/// Parses a source into a compiler, reporting errors with `line:column`.
fn parse_source(source: &Source, limits: ParseLimits) -> CliResult<CausalCompiler> {
    CausalCompiler::from_source(&source.text, limits)
        .map_err(|err| CliError::new(diagnostic(source, err.position(), &err)))
}

/// Formats an error against its source location when one is known.
fn diagnostic(source: &Source, position: Option<usize>, error: &dyn Display) -> String {
    match position {
        Some(position) => {
            let (line, column) = line_column(&source.text, position);
            t!(
                "diagnostic.located",
                source = source.label,
                line = line,
                column = column,
                error = error
            )
        }
        None => t!("diagnostic.plain", source = source.label, error = error),
    }
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_error_message(error: ReadLimitError, kind: &str, path: &Path) -> String {
    match error {
        ReadLimitError::Io(err) => {
            t!("input.read_failed", kind = kind, path = path.display(), error = err)
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => t!("input.read_too_large", kind = kind, path = path.display(), size = size, limit = limit),
    }
}

/// Writes `bytes` to a sibling temp file and renames it over `path`.
///
/// Readers never observe a partially written script.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path.file_name().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |name| name.to_string_lossy(),
    );
    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));
    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    let renamed = written.and_then(|()| fs::rename(&temp_path, path));
    if renamed.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    renamed
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
