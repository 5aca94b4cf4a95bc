use std::sync::Arc;

use anyhow::Context;

use rolegate_api::app::{self, services::AppServices};
use rolegate_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rolegate_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config)
        .await
        .context("failed to initialise services")?;

    if let Some(admin) = &config.bootstrap_admin {
        let user = services
            .accounts
            .ensure_admin(&admin.username, &admin.password)
            .await
            .context("failed to seed bootstrap admin")?;
        tracing::info!(user_id = %user.id, username = %user.username, "bootstrap admin ready");
    }

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
