#![warn(missing_docs)]

//! Entry point for the `transkey` binary.

mod cli;
mod commands;
mod error;

use std::{process, sync::Arc};

use clap::Parser;
use settings_store::{JsonFileStorage, resolve_settings_path, system_locale};
use tokio::runtime::Builder;
use tracing::{debug, error};

use crate::{cli::Cli, error::Result};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and run the chosen command.
fn run() -> Result<()> {
    let Cli {
        log,
        settings,
        locale,
        command,
    } = Cli::parse();
    logging::init(&log);

    let path = resolve_settings_path(settings.as_deref());
    let locale = locale.unwrap_or_else(system_locale);
    debug!(path = %path.display(), %locale, ?command, "command_start");

    let rt = Builder::new_current_thread().enable_all().build()?;
    let out = rt.block_on(async {
        let store = commands::open(Arc::new(JsonFileStorage::new(&path)), &locale).await?;
        commands::run(&store, &command, &locale).await
    })?;
    println!("settings: {}", path.display());
    print!("{out}");
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}
