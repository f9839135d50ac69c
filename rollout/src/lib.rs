pub mod api;
pub mod bucket;
pub mod config;
pub mod errors;
pub mod identifier;
pub mod metrics_defs;
pub mod provider;

use api::AppState;
use axum::Router;
use config::{Config, Listener};
use errors::RolloutError;
use identifier::RandomIdentifierGenerator;
use provider::StaticFeatureProvider;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves the feature endpoints and the admin probes until either listener fails.
pub async fn run(config: Config) -> Result<(), RolloutError> {
    config.validate()?;

    let state = AppState {
        feature: config.feature_name.as_str().into(),
        provider: Arc::new(StaticFeatureProvider::new(config.features)),
        identifiers: Arc::new(RandomIdentifierGenerator),
    };

    let public_task = serve(&config.listener, api::router(state));
    let admin_task = serve(&config.admin_listener, api::admin_router());

    tokio::try_join!(public_task, admin_task)?;
    Ok(())
}

async fn serve(listener: &Listener, app: Router) -> Result<(), RolloutError> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp_listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(tcp_listener, app).await?;
    Ok(())
}
