/// Entry point: config, logging, catalog, then the screen loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;

use config::{GameConfig, LogConfig};
use domain::activity::Catalog;
use domain::pick::RngDice;
use error::GameError;
use sim::game::Game;
use sim::ledger::FileLedger;
use ui::sound::SoundEngine;
use ui::terminal::TerminalSurface;

fn main() -> ExitCode {
    let (config, warnings) = GameConfig::load();
    init_logging(&config.log);
    for w in &warnings {
        tracing::warn!("{w}");
    }

    // Without a catalog there is no game; fail before touching the terminal.
    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("co2quiz: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut surface = TerminalSurface::new(config.image_cache_entries);
    if let Err(e) = surface.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut ledger = FileLedger::new(&config.data.ledger_file);
    tracing::info!(ledger = %ledger.path().display(), assets = %config.data.assets_dir.display(), "starting");
    let dice = RngDice(rand::thread_rng());
    let result = Game::new(&mut surface, &mut ledger, &catalog, dice, &config)
        .with_sound(SoundEngine::new())
        .run();

    if let Err(e) = surface.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("co2quiz: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_catalog(config: &GameConfig) -> error::Result<Catalog> {
    let catalog = Catalog::load(&config.data.catalog_file, config.data.delimiter, config.data.capacity)?;
    if catalog.len() < 2 {
        return Err(GameError::CatalogTooSmall { count: catalog.len() });
    }
    Ok(catalog)
}

/// The terminal belongs to the game, so log lines go to a file.
/// An unusable log file or level only disables logging.
fn init_logging(log: &LogConfig) {
    let level = log.level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    if level == LevelFilter::OFF {
        return;
    }
    let Ok(file) = File::create(&log.file) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .with_ansi(false)
        .init();
}
