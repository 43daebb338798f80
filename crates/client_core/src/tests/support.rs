//! In-process stand-ins for the playlist service.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::BuildPlaylistRequest;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<BuildPlaylistRequest>>>,
}

impl Recorder {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<BuildPlaylistRequest> {
        self.requests.lock().await.clone()
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy)]
pub enum Behavior {
    Accept,
    Reject,
    Slow(Duration),
    Garbled,
    InconsistentStats,
}

#[derive(Clone)]
struct ServerState {
    recorder: Recorder,
    behavior: Behavior,
}

pub fn built_body(request: &BuildPlaylistRequest) -> Value {
    json!({
        "playlist_id": "abc",
        "added_count": 42,
        "min_bpm": request.min_bpm,
        "max_bpm": request.max_bpm,
        "queries": request.queries,
        "fell_back": false,
        "bpm_stats": {
            "total_input": 60,
            "missing_isrc": 4,
            "bp_lookup_failed": 9,
            "bpm_out_of_range_before_nprm": 5,
            "kept": 42
        }
    })
}

async fn handle_build(
    State(state): State<ServerState>,
    Json(request): Json<BuildPlaylistRequest>,
) -> (StatusCode, String) {
    state.recorder.hit();
    state.recorder.requests.lock().await.push(request.clone());

    match state.behavior {
        Behavior::Accept => (StatusCode::OK, built_body(&request).to_string()),
        Behavior::Reject => (StatusCode::INTERNAL_SERVER_ERROR, "db offline".to_string()),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, built_body(&request).to_string())
        }
        Behavior::Garbled => (StatusCode::OK, "<html>maintenance</html>".to_string()),
        Behavior::InconsistentStats => {
            let mut body = built_body(&request);
            body["bpm_stats"]["kept"] = json!(61);
            (StatusCode::OK, body.to_string())
        }
    }
}

async fn handle_ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn spawn_playlist_service(behavior: Behavior) -> (String, Recorder) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/build_playlist", post(handle_build))
        .route("/ping", get(handle_ping))
        .with_state(ServerState {
            recorder: recorder.clone(),
            behavior,
        });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), recorder)
}

/// A local address with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn queries(items: &[&str]) -> Vec<String> {
    items.iter().map(|q| q.to_string()).collect()
}
