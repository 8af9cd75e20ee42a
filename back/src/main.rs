mod config;
mod error;
mod store;
mod v1;

use std::time::Duration;

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use clap::Parser;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::{config::Config, store::TodoStore};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    let store = TodoStore::connect(&config.database_url).await?;
    info!(backend = ?store.backend(), "connected to store");

    store.init_schema().await?;
    info!("todos table ready");

    let app = app(&config, store.clone())?;

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            info!("shutting down");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    let addr = config.addr();
    let service = app.into_make_service();

    match config.tls() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!(%addr, "listening with tls");

            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(service)
                .await?;
        }
        None => {
            info!(%addr, "listening");

            axum_server::bind(addr).handle(handle).serve(service).await?;
        }
    }

    store.close().await;
    info!("store closed");

    Ok(())
}

fn app(config: &Config, store: TodoStore) -> eyre::Result<Router> {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(config.cors()?);

    let app = Router::new()
        .nest("/api", v1::router())
        .layer(layers)
        .with_state(store);

    Ok(app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {:?}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {:?}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
