use anyhow::Context;

use catalog_api::app::{build_app, AppServices};
use catalog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let services = match config.database_url.as_deref() {
        Some(url) => AppServices::connect(url, config.max_connections)
            .await
            .context("failed to connect to postgres")?,
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            AppServices::in_memory()
        }
    };

    let app = build_app(services, config.allowed_origin.as_deref())
        .context("CATALOG_ALLOWED_ORIGIN is not a valid header value")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
