use crate::{config::Config, error, info, server::start_api_server, success, warning};

pub async fn serve(open: bool) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    if config.client_id.is_empty() {
        warning!("SPOTIFY_CLIENT_ID is empty, logins will be rejected by Spotify.");
    }

    let base_url = config.base_url.clone();
    let server = tokio::spawn(start_api_server(config));
    success!("{} is up at {}", env!("CARGO_PKG_NAME"), base_url);

    if open && webbrowser::open(&base_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            base_url
        );
    }

    match server.await {
        Ok(Ok(())) => info!("Server stopped."),
        Ok(Err(e)) => error!("Server failed: {}", e),
        Err(e) => error!("Server task aborted: {}", e),
    }
}
