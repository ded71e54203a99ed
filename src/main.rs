use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tokio::sync::mpsc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use supplylink_api::config::{init_tracing, load_config, AppConfig};
use supplylink_api::db::{establish_connection_from_app_config, run_migrations};
use supplylink_api::events::{process_events, EventSender};
use supplylink_api::handlers::AppServices;
use supplylink_api::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "Starting supplylink-api");

    let db = establish_connection_from_app_config(&config).await?;
    if config.auto_migrate {
        run_migrations(&db).await?;
    }
    let db = Arc::new(db);

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = EventSender::new(event_tx);
    tokio::spawn(process_events(event_rx));

    let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()));
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        event_sender,
        services,
    });

    let cors = build_cors_layer(&config)?;
    let app = app_router(state)
        .layer(CompressionLayer::new())
        .layer(cors);

    let host: IpAddr = config.host.parse()?;
    let addr = SocketAddr::new(host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let configured: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<_, _>>()?;

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if !configured.is_empty() {
        info!("CORS restricted to {} configured origin(s)", configured.len());
        let mut layer = CorsLayer::new()
            .allow_origin(AllowOrigin::list(configured))
            .allow_methods(methods)
            .allow_headers(headers);
        if config.cors_allow_credentials {
            layer = layer.allow_credentials(true);
        }
        return Ok(layer);
    }

    if config.should_allow_permissive_cors() {
        warn!("CORS is permissive; do not use this outside development");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers));
    }

    // load_config() validation should have caught this already
    error!("No CORS origins configured for a non-development environment");
    anyhow::bail!("missing CORS configuration")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
