use axum::{
    extract::Path,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use restkit_core::{mask, Error, ErrorResponse};
use restkit_server::{error, html, json, text, ApiFailure};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Struct1 {
    name: String,
    #[serde(rename = "Foo")]
    foo: i32,
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn find_struct(Path(id): Path<String>) -> Result<Response, ApiFailure> {
    if id != "known" {
        return Err(ErrorResponse::not_found(id, 42).into());
    }
    let found = Struct1 {
        name: "hello".to_string(),
        foo: 543,
    };
    Ok(json(Some(&found), StatusCode::OK)?)
}

fn app() -> Router {
    Router::new()
        .route(
            "/struct",
            get(|| async {
                let value = Struct1 {
                    name: "hello".to_string(),
                    foo: 543,
                };
                json(Some(&value), StatusCode::OK).map_err(ApiFailure::from)
            }),
        )
        .route(
            "/empty",
            get(|| async { json::<()>(None, StatusCode::OK).map_err(ApiFailure::from) }),
        )
        .route("/text", get(|| async { text("plain <b>as is</b>", StatusCode::ACCEPTED) }))
        .route("/html", get(|| async { html("<h1>Hi</h1>", StatusCode::OK) }))
        .route("/structs/{id}", get(find_struct))
}

fn error_app(make: fn() -> Error) -> Router {
    Router::new().route("/", get(move || async move { error(&make()) }))
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- json ---

#[tokio::test]
async fn json_writes_encoded_body() {
    let resp = app().oneshot(get_request("/struct")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json");
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value, serde_json::json!({"name": "hello", "Foo": 543}));
}

#[tokio::test]
async fn json_without_result_has_empty_body() {
    let resp = app().oneshot(get_request("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json");
    assert!(body_bytes(resp).await.is_empty());
}

// --- text / html ---

#[tokio::test]
async fn text_is_written_verbatim() {
    let resp = app().oneshot(get_request("/text")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(content_type(&resp), "text/plain; charset=utf-8");
    assert_eq!(body_bytes(resp).await, "plain <b>as is</b>");
}

#[tokio::test]
async fn html_is_written_verbatim() {
    let resp = app().oneshot(get_request("/html")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "text/html; charset=utf-8");
    assert_eq!(body_bytes(resp).await, "<h1>Hi</h1>");
}

// --- error ---

#[tokio::test]
async fn typed_error_keeps_message_and_code() {
    let resp = error_app(|| ErrorResponse::not_found("id-123", 42).into())
        .oneshot(get_request("/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), "application/json");
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(
        value,
        serde_json::json!({"error": {"message": "id-123", "code": 42}})
    );
}

#[tokio::test]
async fn masked_error_is_unwrapped() {
    let resp = error_app(|| mask(mask(ErrorResponse::precondition_failed("condition-x", 3))))
        .oneshot(get_request("/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value["error"]["message"], "condition-x");
    assert_eq!(value["error"]["code"], 3);
}

#[tokio::test]
async fn unclassified_response_is_bad_request() {
    let resp = error_app(|| ErrorResponse::new("test", 123).into())
        .oneshot(get_request("/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value["error"]["code"], 123);
}

#[tokio::test]
async fn foreign_error_is_bad_request_without_code() {
    let resp = error_app(|| mask(Error::custom("disk on fire")))
        .oneshot(get_request("/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value, serde_json::json!({"error": {"message": "disk on fire"}}));
}

#[tokio::test]
async fn codec_error_is_bad_request_with_its_message() {
    let resp = error_app(|| {
        let err = serde_json::from_str::<Struct1>("not json").unwrap_err();
        Error::Decode(err)
    })
    .oneshot(get_request("/"))
    .await
    .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let value: serde_json::Value = body_json(resp).await;
    let message = value["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("JSON decoding failed"), "{message}");
    assert!(value["error"].get("code").is_none());
}

// --- ApiFailure in handlers ---

#[tokio::test]
async fn handler_failure_renders_as_error() {
    let resp = app().oneshot(get_request("/structs/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(
        value,
        serde_json::json!({"error": {"message": "missing", "code": 42}})
    );
}

#[tokio::test]
async fn handler_success_renders_json() {
    let resp = app().oneshot(get_request("/structs/known")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let found: Struct1 = body_json(resp).await;
    assert_eq!(found.name, "hello");
    assert_eq!(found.foo, 543);
}
