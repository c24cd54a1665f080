use anyhow::Context;
use tracing_subscriber::EnvFilter;

use taskboard::{api, Config, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let store = TaskStore::connect(&config)
        .await
        .context("failed to connect to the task store")?;

    api::serve(config, store).await
}
