use tokio::net::TcpListener;
use tracing::info;

use crate::{
    Res,
    api::{self, AppState},
    config::Config,
};

/// Binds the configured address and serves the application until the
/// process is stopped.
pub async fn start_api_server(config: Config) -> Res<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, base_url = %config.base_url, "listening");

    axum::serve(listener, api::router(AppState::new(config))).await?;
    Ok(())
}
