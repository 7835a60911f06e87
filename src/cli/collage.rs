use std::{path::PathBuf, time::Duration};

use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tabled::Table;

use crate::{
    collage::{self, CollageConfig, ProxyTrackSource, RasterRenderer, Renderer},
    error, info, success,
    types::{Track, TrackTableRow},
    warning,
};

#[derive(Debug, Clone)]
pub struct CollageOptions {
    pub base_url: String,
    pub token: Option<String>,
    pub config: CollageConfig,
    pub list: bool,
    pub out: PathBuf,
}

pub async fn collage(options: CollageOptions) {
    let Some(token) = options.token else {
        error!("No access token. Log in through the web app and pass --token or set CI_ACCESS_TOKEN.");
    };

    let client = Client::new();
    let source = ProxyTrackSource::new(client.clone(), options.base_url.as_str(), token);

    let pb = spinner("Fetching top tracks...");
    let result = collage::build_collage(&source, &options.config).await;
    pb.finish_and_clear();

    let collage = match result {
        Ok(collage) => collage,
        Err(e) => {
            warning!("Failed to fetch top tracks: {}", e);
            relogin(&options.base_url);
            return;
        }
    };

    info!(
        "{} tracks selected for a {}x{} collage ({}, sorted by {}).",
        collage.tracks.len(),
        options.config.size,
        options.config.size,
        options.config.time_range.label(),
        options.config.sort_by.label()
    );

    if options.list {
        println!("{}", Table::new(table_rows(&collage.tracks)));
    }

    let pb = spinner("Drawing collage...");
    let mut renderer = RasterRenderer::new(client);
    let drawn = renderer.draw_grid(&collage.grid).await;
    pb.finish_and_clear();

    if let Err(e) = drawn {
        warning!("Failed to draw collage: {}", e);
        return;
    }

    let export = match renderer.export() {
        Ok(export) => export,
        Err(e) => {
            warning!("Failed to export collage: {}", e);
            return;
        }
    };

    if let Err(e) = async_fs::create_dir_all(&options.out).await {
        warning!("Cannot create {}: {}", options.out.display(), e);
        return;
    }

    let path = options.out.join(&export.file_name);
    match async_fs::write(&path, &export.bytes).await {
        Ok(()) => success!("Collage saved to {}", path.display()),
        Err(e) => warning!("Failed to save collage to {}: {}", path.display(), e),
    }
}

fn table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackTableRow {
            rank: i + 1,
            name: track.name.clone(),
            album: track.album.name.clone(),
            released: track.album.release_date.clone(),
            popularity: track.popularity,
        })
        .collect()
}

fn relogin(base_url: &str) {
    let confirmed = Confirm::new()
        .with_prompt("Token expired. Redirecting to login page now...")
        .default(true)
        .interact()
        .unwrap_or(false);

    if confirmed && webbrowser::open(base_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            base_url
        );
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
