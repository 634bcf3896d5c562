pub mod complete;
pub mod config;
pub mod hearts;
pub mod streak;

use shogidojo_core::{CompletionCoordinator, Config, GameDb};

/// Open the database and build a coordinator from the on-disk configuration.
pub fn open() -> Result<(GameDb, CompletionCoordinator), Box<dyn std::error::Error>> {
    let db = GameDb::open()?;
    let config = Config::load_or_default();
    let coordinator = CompletionCoordinator::new(config.game_clock(), config.hearts_rules());
    Ok((db, coordinator))
}
