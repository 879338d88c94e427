//! In-memory stand-in for an Elasticsearch-like document store.
//!
//! Documents live in `index -> id -> JSON` maps behind a `RwLock`. Response
//! bodies follow the shapes the real server uses for the same routes, so the
//! dispatcher can be exercised end-to-end without an external service.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub type Index = HashMap<String, Value>;
pub type Db = Arc<RwLock<HashMap<String, Index>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(banner))
        .route("/_status/{code}", get(status))
        .route("/{index}", delete(delete_index))
        .route("/{index}/_count", get(count))
        .route(
            "/{index}/{id}",
            get(get_document)
                .put(put_document)
                .post(put_document)
                .delete(delete_document),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn banner() -> Json<Value> {
    Json(json!({ "name": "mock-server", "tagline": "You Know, for Search" }))
}

/// Answer with an arbitrary status so callers can observe 4xx/5xx handling.
async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "found": false })))
}

async fn get_document(
    State(db): State<Db>,
    Path((index, id)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
    let db = db.read().await;
    match db.get(&index).and_then(|docs| docs.get(&id)) {
        Some(source) => (
            StatusCode::OK,
            Json(json!({ "_index": index, "_id": id, "found": true, "_source": source })),
        ),
        None => not_found(),
    }
}

/// The body is parsed as JSON whatever its content type.
async fn put_document(
    State(db): State<Db>,
    Path((index, id)): Path<(String, String)>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let source: Value = match serde_json::from_slice(&body) {
        Ok(source) => source,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "type": "parse_exception", "reason": err.to_string() } })),
            )
        }
    };
    let mut db = db.write().await;
    let previous = db.entry(index.clone()).or_default().insert(id.clone(), source);
    let (status, result) = match previous {
        Some(_) => (StatusCode::OK, "updated"),
        None => (StatusCode::CREATED, "created"),
    };
    (status, Json(json!({ "_index": index, "_id": id, "result": result })))
}

async fn delete_document(
    State(db): State<Db>,
    Path((index, id)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
    let mut db = db.write().await;
    match db.get_mut(&index).and_then(|docs| docs.remove(&id)) {
        Some(_) => (
            StatusCode::OK,
            Json(json!({ "_index": index, "_id": id, "result": "deleted" })),
        ),
        None => not_found(),
    }
}

async fn count(State(db): State<Db>, Path(index): Path<String>) -> Json<Value> {
    let db = db.read().await;
    let count = db.get(&index).map_or(0, HashMap::len);
    Json(json!({ "count": count }))
}

async fn delete_index(
    State(db): State<Db>,
    Path(index): Path<String>,
) -> (StatusCode, Json<Value>) {
    match db.write().await.remove(&index) {
        Some(_) => (StatusCode::OK, Json(json!({ "acknowledged": true }))),
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_matches_store_format() {
        let (status, Json(body)) = not_found();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"found":false}"#);
    }

    #[tokio::test]
    async fn status_route_rejects_invalid_codes() {
        let err = status(Path(42)).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_route_echoes_code() {
        let (code, Json(body)) = status(Path(503)).await.unwrap();
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], 503);
    }
}
