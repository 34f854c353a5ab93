//! Chemkey - A chemistry formula keyboard for the terminal.
//!
//! # Usage
//!
//! ```bash
//! chemkey answer.md
//! chemkey --labels mac answer.md
//! chemkey --no-history --save
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chemkey::app::App;
use chemkey::config::{
    ConfigFlags, LabelMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};

/// A chemistry formula keyboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "chemkey", version, about, long_about = None)]
struct Cli {
    /// Answer file to edit (created on first save)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Keep formula history in this file
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Keep formula history in memory only
    #[arg(long)]
    no_history: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Modifier names on shortcut labels
    #[arg(long, value_enum)]
    labels: Option<LabelMode>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Logs go to a file or nowhere; the terminal belongs to the UI.
fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;
    tracing::debug!(?effective, ?cli, "configuration resolved");

    if (cli.save || cli.clear) && cli.file.is_none() {
        return Ok(());
    }

    if let Some(file) = &cli.file
        && file.is_dir()
    {
        anyhow::bail!("Not a file: {}", file.display());
    }

    let mut app = App::new(cli.file)
        .with_history_enabled(!effective.no_history)
        .with_history_file(effective.history_file.clone())
        .with_platform(effective.label_platform())
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
