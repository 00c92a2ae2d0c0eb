use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod views;


use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parking_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = db::init_db_pool(&config).await?;

    let addr = config.server_addr();
    let app = handlers::router(AppState::new(config, pool));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Parking portal listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
