use std::sync::Arc;

use bus_tracker::{
    api,
    channel::{Channel, SocketIoChannel},
    config::Config,
    maps::MapsClient,
    SessionController,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bus_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting bus tracker");

    let maps = Arc::new(MapsClient::new(&config.maps_api_url, &config.maps_api_key)?);
    let location = config.location_provider()?;

    // Without a relay connection the session still works, it just reports nothing.
    let channel: Option<Arc<dyn Channel>> = match SocketIoChannel::connect(&config.socket_url).await {
        Ok(channel) => {
            tracing::info!("Relay channel open to {}", config.socket_url);
            Some(Arc::new(channel) as Arc<dyn Channel>)
        }
        Err(e) => {
            tracing::error!("Failed to connect to relay server {}: {}", config.socket_url, e);
            None
        }
    };

    let controller = Arc::new(SessionController::new(
        location,
        maps.clone(),
        maps,
        channel,
        config.report_interval(),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(controller.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Control API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Shutting down...");
    controller.shutdown().await;
    Ok(())
}
