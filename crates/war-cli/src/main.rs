//! CLI entry point for the `war` file watcher.
//!
//! Watches one or more paths and, once a path has been quiet for the debounce
//! window, runs a chain of commands in order, stopping at the first failure.
//!
//! # Usage
//!
//! ```bash
//! war -d <path> [-d <path>...] [-r <command>...]
//!
//! # Rebuild and restart on every change in the current directory
//! war -d . -r "echo building" -r make -r myapp.exe
//!
//! # Wider debounce window
//! WAR_DEBOUNCE_MS=500 war -d /tmp -r "echo hello" -r "echo world"
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use war_core::{CommandChain, Config, ConfigError, DEFAULT_DEBOUNCE_MS, WallClock};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// A tiny cross platform file watcher.
///
/// Help is handled before clap sees the arguments, so the usual `-h`/`--help`
/// flags are disabled here.
#[derive(Debug, Parser)]
#[command(name = "war", version, about, long_about = None)]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Path to watch. Repeatable.
    #[arg(short = 'd', long = "dir", value_name = "PATH", action = ArgAction::Append)]
    dirs: Vec<Utf8PathBuf>,

    /// Command to run when a watched path settles. Repeatable; run in order.
    #[arg(
        short = 'r',
        long = "run",
        value_name = "COMMAND",
        action = ArgAction::Append,
        allow_hyphen_values = true
    )]
    commands: Vec<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Quiet period, in milliseconds, before a path's commands run.
    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        env = "WAR_DEBOUNCE_MS",
        default_value_t = DEFAULT_DEBOUNCE_MS
    )]
    debounce_ms: u64,
}

/// What the command line asks for.
#[derive(Debug)]
enum Invocation {
    /// Print usage to stdout and exit successfully.
    Help,
    /// Print the version to stdout and exit successfully.
    Version(String),
    /// The arguments could not be parsed.
    Invalid(String),
    /// Start watching.
    Run(Cli),
}

const USAGE: &str = "\
war is a tiny cross platform file watcher

-d <directory>
-r <command>

Options:

    -v, --verbose        log debug output
    --no-color           disable colored output
    --debounce-ms <MS>   quiet period before running (default 250,
                         or $WAR_DEBOUNCE_MS)

Example:

    war -d . -r \"echo building\" -r make -r myapp.exe

    war -d /tmp -r \"echo hello\" -r \"echo world\"

    The above will watch the current directory (.) and
    run the three commands given with -r in order if
    the prior one was success.
";

/// Fewest argument tokens, after the program name, a watch invocation takes.
const MIN_ARGUMENTS: usize = 4;

// =============================================================================
// ARGUMENT HANDLING
// =============================================================================

fn is_help_token(arg: &OsStr) -> bool {
    matches!(arg.to_str(), Some("help" | "-h" | "-help" | "--help"))
}

/// Classifies the raw process arguments, including `argv[0]`.
///
/// A help token anywhere wins over everything else, even when it is the value
/// of a `-r` flag. A parsed command line still needs [`MIN_ARGUMENTS`] tokens,
/// so `-d a -d b` watches two paths with no commands but `-d a` alone is
/// rejected.
fn parse_invocation(args: &[OsString]) -> Invocation {
    let rest = args.get(1..).unwrap_or_default();
    if rest.is_empty() || rest.iter().any(|arg| is_help_token(arg)) {
        return Invocation::Help;
    }

    match Cli::try_parse_from(args) {
        Ok(_) if rest.len() < MIN_ARGUMENTS => Invocation::Invalid(
            ConfigError::TooFewArguments { given: rest.len() }.to_string(),
        ),
        Ok(cli) => Invocation::Run(cli),
        Err(err) if err.kind() == ErrorKind::DisplayVersion => {
            Invocation::Version(err.to_string())
        }
        Err(err) => Invocation::Invalid(clap_message(&err)),
    }
}

/// First line of a clap error, without its `error: ` prefix.
fn clap_message(err: &clap::Error) -> String {
    let text = err.to_string();
    let first = text.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_owned()
}

/// Builds a validated [`Config`] from CLI arguments.
///
/// # Errors
///
/// Returns an error if no path was given, if a command is blank, or if the
/// debounce window is zero.
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let commands = CommandChain::parse(&cli.commands)?;
    let config = Config::new(cli.dirs.clone(), commands).with_debounce_ms(cli.debounce_ms);
    config.validate()?;
    Ok(config)
}

fn program_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map_or_else(|| "war".to_owned(), |name| name.to_string_lossy().into_owned())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn render_help(program: &str) -> String {
    format!("{program} [command] [arguments]\n\n{USAGE}")
}

fn render_usage_error(program: &str, message: impl fmt::Display) -> String {
    format!("{program}: {message}\n\n{USAGE}")
}

fn print_help(program: &str) -> ExitCode {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = write!(handle, "{}", render_help(program));
    ExitCode::SUCCESS
}

fn usage_error(program: &str, message: impl fmt::Display) -> ExitCode {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{}", render_usage_error(program, message));
    ExitCode::FAILURE
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Prefixes every log line with the local `HH:MM:SS.ffff` time of day.
struct Stamp;

impl FormatTime for Stamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", WallClock::now())
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// `notify` is filtered to `warn` level.
///
/// Lines carry neither target nor level so command output reads as plain
/// stamped text.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            tracing_fmt::layer()
                .with_timer(Stamp)
                .with_target(false)
                .with_level(false)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

/// Cancels `shutdown` on Ctrl-C, or on SIGTERM on Unix.
///
/// # Errors
///
/// Returns an error if the SIGTERM handler cannot be installed.
fn spawn_shutdown_listener(shutdown: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())?
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = tokio::signal::ctrl_c() => debug!("Received SIGINT, shutting down"),
            _ = sigterm.recv() => debug!("Received SIGTERM, shutting down"),
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            debug!("Received Ctrl-C, shutting down");
        }

        shutdown.cancel();
    });

    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Classify arguments; help and usage errors never start the watcher
    let args: Vec<OsString> = std::env::args_os().collect();
    let program = program_name(&args);

    let cli = match parse_invocation(&args) {
        Invocation::Help => return Ok(print_help(&program)),
        Invocation::Version(text) => {
            let _ = write!(std::io::stdout().lock(), "{text}");
            return Ok(ExitCode::SUCCESS);
        }
        Invocation::Invalid(message) => return Ok(usage_error(&program, message)),
        Invocation::Run(cli) => cli,
    };

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Assemble the configuration
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => return Ok(usage_error(&program, err)),
    };

    // 5. Watch until interrupted
    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone())?;

    match war_watcher::run(&config, shutdown).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(usage_error(&program, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("war")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    fn parse(list: &[&str]) -> Cli {
        match parse_invocation(&args(list)) {
            Invocation::Run(cli) => cli,
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments_prints_help() {
        assert!(matches!(parse_invocation(&args(&[])), Invocation::Help));
    }

    #[test]
    fn test_help_tokens_anywhere() {
        for token in ["help", "-h", "-help", "--help"] {
            let invocation = parse_invocation(&args(&["-d", ".", token, "-r", "make"]));
            assert!(matches!(invocation, Invocation::Help), "token {token}");
        }
    }

    #[test]
    fn test_repeated_flags_keep_order() {
        let cli = parse(&["-d", "/tmp", "-r", "echo A", "-d", ".", "-r", "echo B"]);

        assert_eq!(cli.dirs, [Utf8PathBuf::from("/tmp"), Utf8PathBuf::from(".")]);
        assert_eq!(cli.commands, ["echo A", "echo B"]);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_value_may_start_with_hyphen() {
        let cli = parse(&["-d", ".", "-r", "-x"]);
        assert_eq!(cli.commands, ["-x"]);
    }

    #[test]
    fn test_unknown_flag_is_invalid() {
        match parse_invocation(&args(&["-d", ".", "-q"])) {
            Invocation::Invalid(message) => assert!(message.contains("-q")),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_build_config() {
        let cli = parse(&["-d", "/tmp", "-r", "echo hello", "-r", "echo world"]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.watch.paths, [Utf8PathBuf::from("/tmp")]);
        assert_eq!(config.commands.len(), 2);
    }

    #[test]
    fn test_too_few_arguments_is_invalid() {
        for list in [&["-d", "."][..], &["-d", ".", "-v"][..]] {
            match parse_invocation(&args(list)) {
                Invocation::Invalid(message) => {
                    assert_eq!(
                        message,
                        ConfigError::TooFewArguments { given: list.len() }.to_string()
                    );
                }
                other => panic!("Expected Invalid for {list:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_paths_without_commands_are_accepted() {
        let cli = parse(&["-d", ".", "-d", "/tmp"]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.watch.paths, [Utf8PathBuf::from("."), Utf8PathBuf::from("/tmp")]);
        assert!(config.commands.is_empty());
    }

    #[test]
    fn test_build_config_requires_dir() {
        let cli = parse(&["-r", "make", "-r", "true"]);
        assert!(matches!(build_config(&cli), Err(ConfigError::NoWatchPaths)));
    }

    #[test]
    fn test_build_config_rejects_blank_command() {
        let cli = parse(&["-d", ".", "-r", "make", "-r", "   "]);
        assert!(matches!(
            build_config(&cli),
            Err(ConfigError::EmptyCommand { index: 1 })
        ));
    }

    #[test]
    fn test_program_name_uses_basename() {
        let args = vec![OsString::from("/usr/local/bin/war")];
        assert_eq!(program_name(&args), "war");
        assert_eq!(program_name(&[]), "war");
    }

    #[test]
    fn test_usage_error_text() {
        assert_snapshot!(
            render_usage_error("war", ConfigError::TooFewArguments { given: 2 })
                .lines()
                .next()
                .unwrap_or_default(),
            @"war: must specify at least one -d path -r action (got 2 arguments)"
        );
    }

    #[test]
    fn test_help_text() {
        assert_snapshot!(render_help("war"), @r#"
        war [command] [arguments]

        war is a tiny cross platform file watcher

        -d <directory>
        -r <command>

        Options:

            -v, --verbose        log debug output
            --no-color           disable colored output
            --debounce-ms <MS>   quiet period before running (default 250,
                                 or $WAR_DEBOUNCE_MS)

        Example:

            war -d . -r "echo building" -r make -r myapp.exe

            war -d /tmp -r "echo hello" -r "echo world"

            The above will watch the current directory (.) and
            run the three commands given with -r in order if
            the prior one was success.
        "#);
    }
}
