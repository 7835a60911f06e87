#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU16, AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use collageify::{
    config::Config,
    types::{Album, Image, Track},
};
use serde_json::json;
use tokio::net::TcpListener;

pub const MOCK_TOKEN: &str = "mock-token";

/// Everything the mock upstream saw, plus knobs to make it fail.
#[derive(Default)]
pub struct Recorder {
    pub token_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    pub token_status: AtomicU16,
    pub me_status: AtomicU16,
    pub tracks_status: AtomicU16,
    pub token_auth: Mutex<Vec<String>>,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub api_auth: Mutex<Vec<String>>,
    pub track_queries: Mutex<Vec<HashMap<String, String>>>,
    pub tracks: Mutex<Vec<Track>>,
}

impl Recorder {
    pub fn total_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst) + self.api_calls.load(Ordering::SeqCst)
    }

    pub fn fail_token(&self, status: StatusCode) {
        self.token_status.store(status.as_u16(), Ordering::SeqCst);
    }

    pub fn fail_me(&self, status: StatusCode) {
        self.me_status.store(status.as_u16(), Ordering::SeqCst);
    }

    pub fn fail_tracks(&self, status: StatusCode) {
        self.tracks_status.store(status.as_u16(), Ordering::SeqCst);
    }
}

pub struct MockSpotify {
    pub addr: SocketAddr,
    pub recorder: Arc<Recorder>,
}

impl MockSpotify {
    /// Starts a mock accounts + Web API server on an ephemeral port.
    pub async fn start(tracks: Vec<Track>) -> Self {
        let recorder = Arc::new(Recorder::default());
        *recorder.tracks.lock().unwrap() = tracks;

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/top/tracks", get(top_tracks))
            .with_state(recorder.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorder }
    }

    pub fn config(&self) -> Config {
        Config {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            accounts_url: format!("http://{}", self.addr),
            api_url: format!("http://{}/v1", self.addr),
            ..Config::default()
        }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }
}

fn forced_status(code: &AtomicU16) -> Option<StatusCode> {
    match code.load(Ordering::SeqCst) {
        0 => None,
        code => StatusCode::from_u16(code).ok(),
    }
}

fn header(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn token(
    State(rec): State<Arc<Recorder>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    rec.token_calls.fetch_add(1, Ordering::SeqCst);
    rec.token_auth.lock().unwrap().push(header(&headers, AUTHORIZATION));
    rec.token_forms.lock().unwrap().push(form);

    if let Some(status) = forced_status(&rec.token_status) {
        return (status, Json(json!({ "error": "invalid_grant" }))).into_response();
    }
    Json(json!({
        "access_token": MOCK_TOKEN,
        "token_type": "Bearer",
        "scope": "user-top-read",
        "expires_in": 3600,
        "refresh_token": "ignored"
    }))
    .into_response()
}

async fn me(State(rec): State<Arc<Recorder>>, headers: HeaderMap) -> Response {
    rec.api_calls.fetch_add(1, Ordering::SeqCst);
    rec.api_auth.lock().unwrap().push(header(&headers, AUTHORIZATION));

    if let Some(status) = forced_status(&rec.me_status) {
        return (status, Json(json!({ "error": { "status": status.as_u16() } }))).into_response();
    }
    Json(json!({ "id": "ada", "display_name": "Ada Lovelace" })).into_response()
}

async fn top_tracks(
    State(rec): State<Arc<Recorder>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    rec.api_calls.fetch_add(1, Ordering::SeqCst);
    rec.api_auth.lock().unwrap().push(header(&headers, AUTHORIZATION));
    rec.track_queries.lock().unwrap().push(query.clone());

    if let Some(status) = forced_status(&rec.tracks_status) {
        return (status, Json(json!({ "error": { "status": status.as_u16() } }))).into_response();
    }

    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let tracks = rec.tracks.lock().unwrap().clone();

    let items: Vec<Track> = tracks.iter().skip(offset).take(limit).cloned().collect();
    let next = (offset + limit < tracks.len())
        .then(|| format!("http://mock/v1/me/top/tracks?offset={}", offset + limit));

    Json(json!({
        "items": items,
        "next": next,
        "total": tracks.len(),
        "offset": offset,
        "limit": limit
    }))
    .into_response()
}

pub fn track(id: usize, album: &str, popularity: u32, release_date: &str) -> Track {
    Track {
        id: format!("track{id}"),
        name: format!("Track {id}"),
        popularity,
        album: Album {
            name: album.to_string(),
            release_date: release_date.to_string(),
            images: vec![Image {
                url: format!("https://covers.example/{album}.jpg"),
                width: Some(640),
                height: Some(640),
            }],
        },
    }
}

/// `count` tracks, each on its own album.
pub fn distinct_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| track(i, &format!("album{i}"), 50, "2020-01-01"))
        .collect()
}
