//! Application state wiring the service together.
//!
//! The `GameService` is generic over repository/engine traits; AppState pins
//! it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gambit_core::game::service::GameService;
use gambit_infra::config::{load_global_config, resolve_data_dir};
use gambit_infra::engine::uci::UciEngineClient;
use gambit_infra::sqlite::game::SqliteGameRepository;
use gambit_infra::sqlite::pool::DatabasePool;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteGameService = GameService<SqliteGameRepository, UciEngineClient>;

/// Shared application state for the CLI commands and the chat loop.
#[derive(Clone)]
pub struct AppState {
    pub game_service: Arc<ConcreteGameService>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to the DB,
    /// wire the service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("gambit.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let game_service = GameService::new(
            SqliteGameRepository::new(db_pool),
            UciEngineClient::new(&config.engine_path),
            // a config file may carry a bad value; keep the budget sane
            Duration::from_secs_f64(config.move_time_secs.clamp(0.05, 60.0)),
        );

        Ok(Self {
            game_service: Arc::new(game_service),
            data_dir,
        })
    }
}
