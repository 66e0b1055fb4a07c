use std::sync::Arc;

use anyhow::Context;

use eventdesk_api::config::ApiConfig;
use eventdesk_infra::{InMemoryStore, PostgresStore, SharedStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eventdesk_observability::init();

    let config = ApiConfig::from_env()?;

    let store: SharedStore = match &config.database_url {
        Some(url) => {
            let pg = PostgresStore::connect(url)
                .await
                .context("failed to connect to postgres")?;
            pg.migrate().await.context("failed to apply schema")?;
            tracing::info!("using postgres store");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let app = eventdesk_api::app::build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
