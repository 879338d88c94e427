use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body.to_string())
        .unwrap()
}

// --- banner ---

#[tokio::test]
async fn root_returns_banner() {
    let resp = app().oneshot(request("GET", "/", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "mock-server");
}

// --- get ---

#[tokio::test]
async fn get_missing_document_returns_found_false() {
    let resp = app().oneshot(request("GET", "/orders/1", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"found":false}"#);
}

// --- put ---

#[tokio::test]
async fn put_document_without_content_type_returns_201() {
    let resp = app()
        .oneshot(request("PUT", "/orders/1", r#"{"total":3}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "created");
    assert_eq!(body["_index"], "orders");
    assert_eq!(body["_id"], "1");
}

#[tokio::test]
async fn put_malformed_json_returns_400() {
    let resp = app()
        .oneshot(request("PUT", "/orders/1", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["type"], "parse_exception");
}

// --- delete ---

#[tokio::test]
async fn delete_missing_document_returns_404() {
    let resp = app().oneshot(request("DELETE", "/orders/1", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_index_returns_404() {
    let resp = app().oneshot(request("DELETE", "/orders", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- count ---

#[tokio::test]
async fn count_unknown_index_is_zero() {
    let resp = app().oneshot(request("GET", "/orders/_count", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["count"], 0);
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(request("GET", "/_status/503", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 503);
}

// --- full document lifecycle ---

#[tokio::test]
async fn document_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("PUT", "/orders/7", r#"{"item":"book"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // overwrite
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/orders/7", r#"{"item":"lamp"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "updated");

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/orders/7", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["_source"]["item"], "lamp");

    // count
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/orders/_count", ""))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["count"], 1);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/orders/7", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "deleted");

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/orders/7", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // drop the now-empty index
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/orders", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["acknowledged"], true);
}
