//! Engine host - serves registered components over HTTP.

mod demo;
mod identity;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use engine::io::config::load_config;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "engine-host")]
#[command(about = "HTTP host for component updates")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Engine config file (defaults apply when missing)
    #[arg(long, default_value = "engine.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    engine::logging::init("engine_host=info,engine=info");

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let registry = demo::registry()?;
    info!(
        config = %args.config.display(),
        components = registry.iter().count(),
        "starting engine-host"
    );

    let state = AppState::new(registry, config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes::api_router())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
