//! Full-stack exercise against a stand-in apparatus backend
//!
//! Uses the real websocket telemetry channel and the real HTTP gateway
//! against an axum server that mimics the simulator API, then drives the
//! whole transport sequence: stream → sweep → apply → lock both → transfer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::time::timeout;

use console::config::websocket_url;
use console::core::display;
use console::{Console, ConsoleUpdate, HttpCommandGateway, WsTelemetryChannel};
use shared::PortalId;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default)]
struct BackendState {
    transfer_calls: AtomicUsize,
}

fn frame_text(strength: f64) -> String {
    json!({
        "status": "running",
        "run_id": "run_e2e",
        "portal1": {
            "freq": 32.0, "stability": 0.97, "power": 13500.0, "energy": 27000.0,
            "floor_temp": -196.0, "floor_contact": true, "safety_status": true,
            "payload_volume": 0.1, "payload_mass": 75.0, "status_log": []
        },
        "portal2": {
            "freq": 32.08, "stability": 0.95, "power": 13500.0, "energy": 27000.0,
            "floor_temp": -196.0, "floor_contact": true, "safety_status": true,
            "payload_volume": 0.0, "payload_mass": 0.0, "status_log": []
        },
        "bridge_strength": strength,
        "transfer_energy": 0.0,
        "detune": 0.08,
        "status_log": ["[INFO] Bridge strength updated."]
    })
    .to_string()
}

async fn ws_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(stream_frames)
}

async fn stream_frames(mut socket: WebSocket) {
    let _ = socket.send(Message::Text(frame_text(0.62))).await;
    // Hold the stream open; the test ends the session from the client side.
    futures_util::future::pending::<()>().await;
}

fn backend_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route(
            "/api/parameter_sweep",
            post(|| async {
                Json(json!({
                    "status": "success",
                    "results": [
                        {"freq1": 31.0, "freq2": 31.0, "energy1": 8500.0, "energy2": 8500.0, "bridge_strength": 0.48},
                        {"freq1": 32.0, "freq2": 32.0, "energy1": 9000.0, "energy2": 9000.0, "bridge_strength": 0.71},
                        {"freq1": 33.0, "freq2": 33.0, "energy1": 9500.0, "energy2": 9500.0, "bridge_strength": 0.55}
                    ]
                }))
            }),
        )
        .route(
            "/api/apply_optimal_parameters",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["freq1"], 32.0);
                Json(json!({"status": "success"}))
            }),
        )
        .route(
            "/api/lock_portal",
            post(
                |Query(params): Query<std::collections::HashMap<String, String>>| async move {
                    let portal: u8 = params
                        .get("portal")
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(1);
                    Json(json!({
                        "status": "success",
                        "portal": portal,
                        "locked": true
                    }))
                },
            ),
        )
        .route(
            "/api/transfer_payload",
            post(|State(state): State<Arc<BackendState>>| async move {
                state.transfer_calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "status": "success",
                    "transfer_result": true,
                    "bridge_strength": 0.62
                }))
            }),
        )
        .with_state(state)
}

async fn spawn_backend(state: Arc<BackendState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend_router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn full_transport_sequence_against_a_live_backend() {
    shared::logging::init_tracing_for_tests();

    let backend = Arc::new(BackendState::default());
    let addr = spawn_backend(backend.clone()).await;
    let base_url = format!("http://{addr}");

    let telemetry = WsTelemetryChannel::new(websocket_url(&base_url));
    let gateway = HttpCommandGateway::new(&base_url);
    let console = Arc::new(Console::new(telemetry, gateway));

    let mut updates = console.subscribe();
    let _runner = {
        let console = console.clone();
        tokio::spawn(async move { console.run().await })
    };

    // Wait for the first streamed frame to land.
    timeout(TEST_TIMEOUT, async {
        loop {
            if let Ok(ConsoleUpdate::Snapshot(_)) = updates.recv().await {
                break;
            }
        }
    })
    .await
    .expect("no telemetry frame arrived");

    let snapshot = console.snapshot().await.unwrap();
    assert_eq!(snapshot.run_id.as_deref(), Some("run_e2e"));
    assert!(display::coupling_active(snapshot.bridge.strength));
    assert_eq!(
        display::transfer_direction(snapshot.bridge.detune),
        Some(PortalId::One)
    );

    // Optimize: sweep the neighborhood and apply the strongest candidate.
    let count = console
        .run_sweep(shared::SweepRequest::around_default(2.0))
        .await
        .unwrap();
    assert_eq!(count, 3);
    let applied = console.apply_optimal().await.unwrap();
    assert_eq!(applied.freq1, 32.0);

    // Lock both endpoints, then transfer.
    console.lock(PortalId::One).await.unwrap();
    console.lock(PortalId::Two).await.unwrap();
    assert!(console.transport_ready().await);

    let response = console.transfer().await.unwrap();
    assert!(response.transfer_result);
    assert_eq!(backend.transfer_calls.load(Ordering::SeqCst), 1);

    console.shutdown().await.unwrap();
    assert!(!console.is_connected().await);
}
