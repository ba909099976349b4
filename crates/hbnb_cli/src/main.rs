//! `hbnb` console entry point.
//!
//! # Responsibility
//! - Read startup configuration from flags and environment.
//! - Initialize logging, reload the backing file, run the console loop.
//! - Flush the registry on exit as a best effort.

use clap::Parser;
use hbnb_core::console::{self, Console};
use hbnb_core::{
    default_log_level, init_logging, FileStorage, RecordService, RecordStorage,
    DEFAULT_STORAGE_FILE,
};
use log::{info, warn};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command console for the hbnb record store.
#[derive(Debug, Parser)]
#[command(name = "hbnb", version, about)]
struct Cli {
    /// JSON file holding every record.
    #[arg(long, env = "HBNB_FILE", default_value = DEFAULT_STORAGE_FILE)]
    file: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "HBNB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "HBNB_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = cli
        .log_dir
        .unwrap_or_else(|| std::env::temp_dir().join("hbnb").join("logs"));
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let storage = match FileStorage::open(&cli.file) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("error: cannot load `{}`: {err}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_start module=cli status=ok file={} records={} core_version={}",
        storage.path().display(),
        storage.len(),
        hbnb_core::core_version()
    );

    let mut console = Console::new(RecordService::new(storage));
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout().lock();
    let loop_result = console::run(&mut console, stdin.lock(), &mut stdout, interactive);

    let storage = console.into_service().into_storage();
    if let Err(err) = storage.persist() {
        warn!("event=cli_exit module=cli status=error flush=failed error={err}");
        eprintln!("warning: final save failed: {err}");
    }

    match loop_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: console i/o failed: {err}");
            ExitCode::FAILURE
        }
    }
}
