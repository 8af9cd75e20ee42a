use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use tower_http::cors::CorsLayer;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug, Parser)]
#[command(name = "back", about = "Todo list API service")]
pub struct Config {
    /// Store connection string, `sqlite:` or `postgres://`.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://todos.db?mode=rwc")]
    pub database_url: String,

    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Origin allowed to make cross-origin requests. Takes precedence over
    /// `--cors-origin`.
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    #[arg(long, env = "SSL_CERT", requires = "ssl_key")]
    pub ssl_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "ssl_cert")]
    pub ssl_key: Option<PathBuf>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn allowed_origin(&self) -> &str {
        (self.frontend_url.as_deref())
            .or(self.cors_origin.as_deref())
            .unwrap_or(DEFAULT_ORIGIN)
    }

    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.ssl_cert.as_ref().zip(self.ssl_key.as_ref())
    }

    pub fn cors(&self) -> eyre::Result<CorsLayer> {
        let origin = self.allowed_origin();

        // credentials cannot be combined with a wildcard origin
        if origin == "*" {
            eyre::bail!("CORS origin must be an explicit origin, not `*`");
        }

        let origin = HeaderValue::from_str(origin)
            .map_err(|err| eyre::eyre!("invalid CORS origin {origin:?}: {err}"))?;

        Ok(CorsLayer::new()
            .allow_origin([origin])
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]))
    }
}
