use std::sync::Arc;

use anyhow::{Context, Result};
use bank::Database;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub database: Database,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let database = Database::open(config.database_path.clone(), config.busy_timeout)
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.database_path.display()
                )
            })?;

        Ok(Arc::new(Self { config, database }))
    }
}
