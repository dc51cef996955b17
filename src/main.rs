//! Blockpad - a terminal block editor with inline buttons.
//!
//! # Usage
//!
//! ```bash
//! blockpad --seed
//! blockpad notes.json
//! blockpad --watch --conversion append notes.json
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blockpad::app::App;
use blockpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use blockpad::trigger::{ConversionMode, DEFAULT_TRIGGER_DELAY};
use blockpad::workspace::WorkspaceOptions;

/// A terminal block editor that turns `[label]` into inline buttons
#[derive(Parser, Debug)]
#[command(name = "blockpad", version, about, long_about = None)]
struct Cli {
    /// Document to open (created on first save when missing)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Watch the document file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Name of the document
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Delay between Space/Enter and the trigger scan
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// How a typed [label] becomes a button
    #[arg(long, value_enum)]
    conversion: Option<ConversionMode>,

    /// Start a new document from the welcome content
    #[arg(long)]
    seed: bool,

    /// Write logs to a file (otherwise BLOCKPAD_LOG_FILE, otherwise discarded)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save_defaults: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear_defaults: bool,
}

/// The terminal belongs to the UI, so logs go to a file or nowhere.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear_defaults {
        clear_config_flags(&global_path)?;
    }
    if cli.save_defaults {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear_defaults {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let log_path = effective
        .log_file
        .clone()
        .or_else(|| std::env::var_os("BLOCKPAD_LOG_FILE").map(PathBuf::from));
    init_logging(log_path.as_deref())?;

    let options = WorkspaceOptions {
        trigger_delay: effective
            .debounce_ms
            .map_or(DEFAULT_TRIGGER_DELAY, Duration::from_millis),
        conversion: effective.conversion.unwrap_or_default(),
    };

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_seed(effective.seed)
        .with_document_name(effective.name)
        .with_options(options)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
