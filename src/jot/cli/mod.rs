//! The `jot` binary: argument parsing, logging setup and terminal output.
//! Everything else goes through [`jot::api::JotApi`].

mod commands;
mod print;
mod setup;

use clap::Parser;
use directories::ProjectDirs;
use jot::api::JotApi;
use jot::error::{JotError, Result};
use jot::store::fs::FileStore;
use setup::{Cli, Commands};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub struct AppContext {
    pub api: JotApi<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home = resolve_home(cli.home.clone())?;
    let mut ctx = AppContext {
        api: JotApi::open(&home)?,
    };

    match cli.command {
        Some(Commands::New) => commands::new(&ctx),
        Some(Commands::Save {
            name,
            content,
            lock,
            unlock,
            token,
        }) => commands::save(&ctx, &name, content, lock, unlock, token),
        Some(Commands::Show { name, token, raw }) => commands::show(&ctx, &name, token, raw),
        Some(Commands::Rm { name, token }) => commands::rm(&ctx, &name, token),
        Some(Commands::Lock {
            name,
            token,
            current,
        }) => commands::lock(&ctx, &name, &token, current),
        Some(Commands::Unlock { name, token }) => commands::unlock(&ctx, &name, &token),
        Some(Commands::List { backup }) => commands::list(&ctx, backup),
        Some(Commands::Sweep { days, every }) => commands::sweep(&ctx, days, every),
        Some(Commands::Doctor) => commands::doctor(&ctx),
        Some(Commands::Stats) => commands::stats(&ctx),
        Some(Commands::Limits {
            max_file_size,
            max_total_size,
            max_note_count,
        }) => commands::limits(&mut ctx, max_file_size, max_total_size, max_note_count),
        Some(Commands::Config) => commands::config(&ctx),
        None => commands::list(&ctx, false),
    }
}

/// Logs go to stderr; stdout carries note content. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,jot=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn resolve_home(home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home);
    }
    ProjectDirs::from("com", "jot", "jot")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            JotError::Config("Could not determine a data directory; pass --home".to_string())
        })
}
