use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{decompression::RequestDecompressionLayer, trace::TraceLayer};
use tracing::{error, info};

use super::{services, state::AppState};
use crate::config::Config;
use crate::modules::{BaasClient, Modules};
use crate::probe::probe_filesystem;
use crate::samples::{SampleOptions, register_samples};
use crate::service::{FlexOptions, service};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the adapter router; every route but `/health` needs the shared secret
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/data/{collection}",
            get(services::fetch_all).post(services::create),
        )
        .route(
            "/data/{collection}/{id}",
            get(services::fetch_one)
                .put(services::update)
                .delete(services::delete),
        )
        .route("/functions/{name}", post(services::invoke_function))
        .route("/auth/{name}", post(services::authenticate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            services::require_shared_secret,
        ));

    Router::new()
        .route("/health", get(services::health))
        .merge(protected)
        .with_state(state)
        .layer(RequestDecompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Initialize the service, register handlers and build the adapter state
pub fn build_state(config: Config) -> Result<AppState, AnyError> {
    let shared_secret = config.service.shared_secret.clone().unwrap_or_default();
    let mut flex = service(FlexOptions::new(shared_secret))?;

    let options = SampleOptions {
        business_logic_delay: Duration::from_millis(config.samples.business_logic_delay_ms),
    };
    register_samples(flex.registry(), &options)?;

    let modules = match config.modules.baas_url {
        Some(ref url) => Modules::from_client(BaasClient::new(
            url.clone(),
            config.modules.request_timeout(),
        )?),
        None => {
            info!("No platform URL configured; email and push modules are disabled");
            Modules::unconfigured()
        }
    };

    let (shared_secret, registry) = flex.into_parts();
    Ok(AppState::new(config, registry, shared_secret, modules))
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    let address = address.unwrap_or(config.server.bind_addr);

    if config.runtime.filesystem_probe {
        let path = config.runtime.probe_path.clone();
        tokio::spawn(async move {
            probe_filesystem(&path).await;
        });
    }

    let state = build_state(config)?;
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Flex service listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
