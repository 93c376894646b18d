use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Instrument, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use zohobooks::config::Config;
use zohobooks::module::{self, Invocation, ModuleName, RunOptions};

/// Run a Zoho Books module and print its JSON result
#[derive(Parser, Debug)]
#[command(name = "zohobooks", version, about, long_about = None)]
struct Args {
    /// Module to run
    #[arg(value_enum)]
    module: ModuleName,

    /// JSON or YAML argument file (stdin when omitted)
    args_file: Option<PathBuf>,

    /// Report what would change without changing anything
    #[arg(long)]
    check: bool,

    /// Include before/after of changed fields
    #[arg(long)]
    diff: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();
    let file = open_log_file(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("zohobooks started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("zohobooks").join("zohobooks.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".zohobooks").join("zohobooks.log");
    }
    PathBuf::from("zohobooks.log")
}

fn read_arguments(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read argument file {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read arguments from stdin")?;
            Ok(text)
        }
    }
}

/// Run the module; `Err` carries the failure result
async fn execute(args: &Args) -> std::result::Result<Value, Value> {
    let text = read_arguments(args.args_file.as_deref())
        .map_err(|e| json!({"failed": true, "changed": false, "msg": format!("{:#}", e)}))?;

    let invocation = Invocation::parse(&text).map_err(|e| module::failure(&e))?;
    let options = RunOptions {
        check_mode: args.check || invocation.options.check_mode,
        diff_mode: args.diff || invocation.options.diff_mode,
    };

    let config = Config::load();
    match module::run(args.module, &invocation.args, &config, options).await {
        Ok(output) => {
            tracing::info!("{} finished: changed={}", args.module.as_str(), output.changed);
            Ok(output.into_json())
        }
        Err(e) => {
            tracing::error!("{} failed: {}", args.module.as_str(), e);
            Err(module::failure(&e))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("invocation", %run_id, module = args.module.as_str());
    let result = execute(&args).instrument(span).await;

    let (output, code) = match result {
        Ok(output) => (output, ExitCode::SUCCESS),
        Err(failure) => (failure, ExitCode::FAILURE),
    };
    println!("{}", output);

    drop(guard);
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("zohobooks.log");

        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = open_log_file(&blocker.join("zohobooks.log")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to create log directory"));
    }
}
