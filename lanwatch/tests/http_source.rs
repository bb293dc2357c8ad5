//! HttpSource against an in-process axum stub.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lanwatch::api::{DataSource, HttpSource, Kind, Payload};
use lanwatch::error::SyncError;
use lanwatch::mutation::{request_mutation, MutationOutcome, PendingMutation};
use lanwatch::types::{BlockedHost, MacAddr};
use serde_json::{json, Value};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn devices() -> Json<Value> {
    Json(json!({
        "items": [
            {"name": "Faculty-PC-01", "ip": "192.168.1.10", "mac": "00:1a:2b:3c:4d:11", "status": "Active"},
            {"name": "Unknown-Device", "ip": "192.168.1.66", "mac": "00:1A:2B:3C:4D:99", "status": "Risk"},
            {"ip": "192.168.1.80"}
        ],
        "aggregate": {"total": 3, "active": 1, "atRisk": 1, "blocked": 0}
    }))
}

async fn traffic() -> Json<Value> {
    Json(json!({
        "bandwidth": {"upload_kbps": 120.5, "download_kbps": 420.0},
        "packets": {"per_second": 1200},
        "protocols": {"TCP": 65, "UDP": 25, "ICMP": 10}
    }))
}

async fn mutate(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    let key = body["key"].as_str().unwrap_or_default().to_string();
    seen.lock().unwrap().push(body);
    match key.as_str() {
        "00:1A:2B:3C:4D:88" => return (StatusCode::CONFLICT, "host is a gateway").into_response(),
        "00:1A:2B:3C:4D:77" => return Json(json!({"detail": "queued"})).into_response(),
        _ => {}
    }
    Json(json!({"status": "blocked", "message": "Manual admin action"})).into_response()
}

async fn stub() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/entities/devices", get(devices))
        .route(
            "/api/entities/alerts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/entities/blocked", get(|| async { "{not json" }))
        .route("/api/entities/traffic", get(traffic))
        .route("/api/entities/mutate", post(mutate))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), seen)
}

fn source(base: &str) -> HttpSource {
    HttpSource::new(base, None, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn devices_decode_with_server_aggregate() {
    let (base, _) = stub().await;
    let Payload::Devices { items, aggregate } = source(&base).fetch(Kind::Devices).await.unwrap()
    else {
        panic!("expected devices payload");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].mac.as_ref().unwrap().as_str(), "00:1A:2B:3C:4D:11");
    assert!(items[2].name.is_none());
    let agg = aggregate.unwrap();
    assert_eq!((agg.total, agg.active, agg.at_risk), (3, 1, 1));
}

#[tokio::test]
async fn traffic_decodes_protocol_mix() {
    let (base, _) = stub().await;
    let Payload::Traffic(t) = source(&base).fetch(Kind::Traffic).await.unwrap() else {
        panic!("expected traffic payload");
    };
    assert_eq!(t.packets.per_second, 1200);
    assert_eq!((t.protocols.tcp, t.protocols.udp, t.protocols.icmp), (65, 25, 10));
}

#[tokio::test]
async fn server_error_is_network_and_bad_body_is_parse() {
    let (base, _) = stub().await;
    let src = source(&base);
    assert!(matches!(src.fetch(Kind::Alerts).await, Err(SyncError::Network(m)) if m.contains("500")));
    assert!(matches!(src.fetch(Kind::Blocked).await, Err(SyncError::Parse(_))));
}

#[tokio::test]
async fn unreachable_backend_is_network() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let src = source(&format!("http://127.0.0.1:{port}/api/"));
    let err = src.fetch(Kind::Devices).await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn confirmed_block_posts_keyed_request() {
    let (base, seen) = stub().await;
    let src = source(&base);
    let device = lanwatch::demo::seed_devices().remove(2);
    let pending = PendingMutation::block(&device).unwrap();

    let outcome = request_mutation(&src, &pending, true).await.unwrap();
    assert!(matches!(outcome, MutationOutcome::Acked(a) if a.status == "blocked"));

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![json!({"key": "00:1A:2B:3C:4D:99", "action": "block", "reason": "Manual admin action"})]
    );
}

#[tokio::test]
async fn rejected_unblock_is_mutation_error() {
    let (base, seen) = stub().await;
    let host = BlockedHost {
        ip: Some("192.168.1.72".into()),
        mac: Some(MacAddr::new("00:1a:2b:3c:4d:88")),
        ..BlockedHost::default()
    };
    let pending = PendingMutation::unblock(&host).unwrap();
    let err = request_mutation(&source(&base), &pending, true)
        .await
        .unwrap_err();
    assert_eq!(err, SyncError::Mutation("HTTP 409 Conflict: host is a gateway".into()));
    assert_eq!(seen.lock().unwrap()[0]["action"], "unblock");
    assert!(seen.lock().unwrap()[0].get("reason").is_none());
}

#[tokio::test]
async fn ack_without_status_is_reported_ok() {
    let (base, _) = stub().await;
    let host = BlockedHost {
        mac: Some(MacAddr::new("00:1a:2b:3c:4d:77")),
        ..BlockedHost::default()
    };
    let pending = PendingMutation::unblock(&host).unwrap();
    let outcome = request_mutation(&source(&base), &pending, true).await.unwrap();
    assert!(matches!(outcome, MutationOutcome::Acked(a) if a.status == "ok"));
}
