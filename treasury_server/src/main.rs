mod address_proxy;
mod collections;
mod docs;
mod error;
mod info;
mod market;
mod merkl;
mod middlewares;
mod router;
mod save;
mod spacescan_proxy;
mod state;
mod treasury;
mod util;

use dotenvy::dotenv;
use log::info;
use router::router;
use state::ServerState;
use treasury_core::config::Config;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let server_domain = config.server_domain.clone();

    let app = router(ServerState::from_config(&config)?);

    let listener = tokio::net::TcpListener::bind(&server_domain).await?;
    info!("Listening on {}", server_domain);

    axum::serve(listener, app).await?;

    Ok(())
}
