//! Integration tests running the client against an in-process asset server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assetlayer::{AssetClient, BatchItem, ClientConfig};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

struct AssetServer {
    maps: HashMap<String, Value>,
    blobs: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
    delay: Duration,
}

impl AssetServer {
    fn new(delay: Duration) -> Self {
        let mut maps = HashMap::new();
        maps.insert(
            "100000000".to_string(),
            json!({"id": "100000000", "info": {"name": "Henesys", "town": true}, "life": []}),
        );
        maps.insert(
            "101000000".to_string(),
            json!({"id": "101000000", "info": {"name": "Ellinia", "town": true}}),
        );
        maps.insert(
            "102000000".to_string(),
            json!({"id": "102000000", "info": {"name": "Perion", "town": true}}),
        );

        let mut blobs = HashMap::new();
        blobs.insert("deadbeef".to_string(), vec![0x89, b'P', b'N', b'G']);

        Self {
            maps,
            blobs,
            requests: AtomicUsize::new(0),
            delay,
        }
    }

    async fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn lookup(&self, asset_type: &str, id: &str, section: Option<&str>) -> Option<Value> {
        if asset_type != "map" {
            return None;
        }
        let entity = self.maps.get(id)?;
        match section {
            Some(section) => entity.get(section).cloned(),
            None => Some(entity.clone()),
        }
    }
}

type Shared = Arc<AssetServer>;

fn envelope(found: Option<Value>) -> Response {
    match found {
        Some(data) => (StatusCode::OK, Json(json!({"ok": true, "data": data}))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"ok": false, "error": {"code": "NOT_FOUND", "message": "not found"}})),
        )
            .into_response(),
    }
}

async fn entity(
    State(server): State<Shared>,
    Path((asset_type, id)): Path<(String, String)>,
) -> Response {
    server.hit().await;
    envelope(server.lookup(&asset_type, &id, None))
}

async fn section(
    State(server): State<Shared>,
    Path((asset_type, id, section)): Path<(String, String, String)>,
) -> Response {
    server.hit().await;
    envelope(server.lookup(&asset_type, &id, Some(&section)))
}

async fn blob(State(server): State<Shared>, Path(hash): Path<String>) -> Response {
    server.hit().await;
    match server.blobs.get(&hash) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn batch(State(server): State<Shared>, Json(items): Json<Vec<BatchItem>>) -> Response {
    server.hit().await;
    let results: Vec<Value> = items
        .iter()
        .map(|item| {
            let found = server.lookup(&item.asset_type, &item.id, item.section.as_deref());
            let result = match found {
                Some(data) => json!({"ok": true, "data": data}),
                None => {
                    let message = format!("{} {} not found", item.asset_type, item.id);
                    json!({"ok": false, "error": {"code": "NOT_FOUND", "message": message}})
                }
            };
            json!({"result": result})
        })
        .collect();
    Json(json!({"ok": true, "results": results})).into_response()
}

async fn spawn_server(delay: Duration) -> (SocketAddr, Shared) {
    let state = Arc::new(AssetServer::new(delay));
    let app = Router::new()
        .route("/api/v1/asset/:asset_type/:id", get(entity))
        .route("/api/v1/asset/:asset_type/:id/:section", get(section))
        .route("/api/v1/blob/:hash", get(blob))
        .route("/api/v1/batch", post(batch))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn client_for(addr: SocketAddr, config: ClientConfig) -> AssetClient {
    AssetClient::new(config.with_base_url(format!("http://{}", addr))).unwrap()
}

fn requests(server: &Shared) -> usize {
    server.requests.load(Ordering::SeqCst)
}

#[tokio::test]
async fn test_capacity_two_evicts_oldest() {
    let (addr, server) = spawn_server(Duration::ZERO).await;
    let client = client_for(addr, ClientConfig::default().with_max_cache_entries(2));

    client.get_entity("map", "100000000").await.unwrap();
    client.get_entity("map", "101000000").await.unwrap();
    assert_eq!(client.diagnostics().cache.size, 2);

    client.get_entity("map", "102000000").await.unwrap();
    let diagnostics = client.diagnostics();
    assert_eq!(diagnostics.cache.size, 2);
    assert_eq!(diagnostics.cache.evictions, 1);

    // The first map was the one evicted
    client.get_entity("map", "101000000").await.unwrap();
    assert_eq!(requests(&server), 3);
    client.get_entity("map", "100000000").await.unwrap();
    assert_eq!(requests(&server), 4);
}

#[tokio::test]
async fn test_unknown_entity_is_absent_without_error() {
    let (addr, _server) = spawn_server(Duration::ZERO).await;
    let client = client_for(addr, ClientConfig::default());

    assert!(client.get_entity("map", "999").await.is_none());

    let diagnostics = client.diagnostics();
    assert_eq!(diagnostics.cache.size, 0);
    assert_eq!(diagnostics.total_errors, 0);
}

#[tokio::test]
async fn test_simultaneous_section_fetches_coalesce() {
    let (addr, server) = spawn_server(Duration::from_millis(50)).await;
    let client = client_for(addr, ClientConfig::default());

    let (a, b) = tokio::join!(
        client.get_section("map", "100000000", "info"),
        client.get_section("map", "100000000", "info"),
    );

    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a["name"], "Henesys");
    assert!(client.diagnostics().coalesced_requests >= 1);
    assert_eq!(requests(&server), 1);
}

#[tokio::test]
async fn test_many_concurrent_callers_share_one_request() {
    let (addr, server) = spawn_server(Duration::from_millis(50)).await;
    let client = Arc::new(client_for(addr, ClientConfig::default()));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_entity("map", "101000000").await })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    for result in results {
        let value = result.unwrap().unwrap();
        assert_eq!(value["info"]["name"], "Ellinia");
    }

    let diagnostics = client.diagnostics();
    assert_eq!(requests(&server), 1);
    assert_eq!(diagnostics.total_requests, 1);
    assert_eq!(diagnostics.in_flight_requests, 0);
    assert!(diagnostics.coalesced_requests >= 1);
}

#[tokio::test]
async fn test_batch_mixed_results() {
    let (addr, _server) = spawn_server(Duration::ZERO).await;
    let client = client_for(addr, ClientConfig::default());

    let results = client
        .batch(&[
            BatchItem::entity("map", "100000000"),
            BatchItem::entity("map", "999"),
        ])
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].ok);
    assert_eq!(results[0].data.as_ref().unwrap()["id"], "100000000");
    assert!(!results[1].ok);
    assert_eq!(results[1].error.as_deref(), Some("map 999 not found"));
}

#[tokio::test]
async fn test_sequential_fetch_hits_cache() {
    let (addr, server) = spawn_server(Duration::ZERO).await;
    let client = client_for(addr, ClientConfig::default());

    client.get_entity("map", "100000000").await.unwrap();
    let after_first = client.diagnostics();
    assert_eq!(after_first.cache.misses, 1);
    assert_eq!(after_first.cache.hits, 0);

    client.get_entity("map", "100000000").await.unwrap();
    let after_second = client.diagnostics();
    assert_eq!(after_second.cache.hits, 1);
    assert_eq!(after_second.total_requests, 1);
    assert_eq!(requests(&server), 1);
}

#[tokio::test]
async fn test_blob_round_trip() {
    let (addr, _server) = spawn_server(Duration::ZERO).await;
    let client = client_for(addr, ClientConfig::default());

    let blob = client.get_blob("deadbeef").await.unwrap();
    assert_eq!(blob.as_ref(), &[0x89, b'P', b'N', b'G']);
    assert!(client.get_blob("cafebabe").await.is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(
        addr,
        ClientConfig::default()
            .with_max_retries(1)
            .with_timeout(Duration::from_millis(500)),
    );

    assert!(client.get_entity("map", "100000000").await.is_none());
    let results = client.batch(&[BatchItem::entity("map", "100000000")]).await;
    assert_eq!(results[0].error.as_deref(), Some("Network error"));

    let diagnostics = client.diagnostics();
    assert_eq!(diagnostics.total_errors, 2);
    assert_eq!(diagnostics.total_requests, 2);
    assert_eq!(diagnostics.cache.size, 0);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let (addr, server) = spawn_server(Duration::from_millis(300)).await;
    let client = client_for(
        addr,
        ClientConfig::default()
            .with_max_retries(0)
            .with_timeout(Duration::from_millis(50)),
    );

    assert!(client.get_entity("map", "100000000").await.is_none());
    assert_eq!(client.diagnostics().total_errors, 1);
    assert_eq!(requests(&server), 1);
}
