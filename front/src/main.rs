use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use clap::Parser;
use front::{api::ApiClient, App};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "front", about = "Web page for the todo list API")]
struct Args {
    /// Base URL of the API service.
    #[arg(long, env = "TICK_API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    #[arg(long, env = "FRONT_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    #[arg(long, env = "FRONT_PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let app = Arc::new(App::new(ApiClient::new(&args.api_url)));
    tokio::spawn({
        let app = app.clone();
        async move { app.load().await }
    });

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, api = %args.api_url, "serving todo page");

    axum::serve(listener, front::router(app))
        .with_graceful_shutdown(async {
            if let Err(err) = signal::ctrl_c().await {
                error!("failed to listen for ctrl-c: {:?}", err);
            }
        })
        .await?;

    Ok(())
}
