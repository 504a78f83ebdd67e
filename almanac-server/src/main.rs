//! Almanac server - HTTP access to the almanac pipeline and chat message buffer.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use almanac::io::config::{DEFAULT_CONFIG_FILE, load_config};
use almanac::io::fetch::HttpFetcher;
use almanac::pipeline::Pipeline;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "almanac-server")]
#[command(about = "HTTP API for the almanac field pipeline")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Pipeline config file (defaults apply when it does not exist)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("almanac_server=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let cfg = load_config(&args.config)?;
    info!(
        config = %args.config.display(),
        upstream = %cfg.upstream.base_url,
        format = ?cfg.output.format,
        "starting almanac-server"
    );

    let state = AppState::new(
        Pipeline::from_config(&cfg),
        Arc::new(HttpFetcher::from_config(&cfg.upstream)),
        cfg.context.expiry(),
    );

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
