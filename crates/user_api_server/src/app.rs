//! axum adapter around the core `UserHandler`.
//!
//! # Responsibility
//! - Forward every request to the path-based core dispatcher.
//! - Run blocking repository work off the async executor.
//! - Cancel the request context when the client goes away.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use log::error;
use std::time::Duration;
use user_api_core::{ApiError, ApiResponse, CancellationToken, RequestContext, UserHandler};

#[derive(Clone)]
pub struct AppState {
    pub handler: UserHandler,
    pub request_timeout: Duration,
}

/// Builds the router. The core resolves paths itself, so every request
/// lands in the fallback.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

struct CancelOnDrop(CancellationToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let token = CancellationToken::new();
    let _guard = CancelOnDrop(token.clone());
    let ctx = RequestContext::with_timeout(state.request_timeout).with_token(token);
    let handler = state.handler.clone();
    let path = uri.path().to_string();

    let joined =
        tokio::task::spawn_blocking(move || handler.handle(&ctx, &method, &path, &body)).await;

    match joined {
        Ok(response) => into_axum(response),
        Err(err) => {
            error!(
                "event=http_request module=server status=error error_code=handler_join_failed error={}",
                err
            );
            into_axum(ApiError::Internal.into_response())
        }
    }
}

fn into_axum(response: ApiResponse) -> Response {
    let content_type = [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))];
    let mut out = (response.status, content_type, response.body_bytes()).into_response();
    if let Some(allow) = response.allow {
        out.headers_mut().insert(header::ALLOW, HeaderValue::from_static(allow));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{into_axum, router, AppState, CancelOnDrop};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use user_api_core::{ApiError, CancellationToken, InMemoryUserRepository, UserHandler};

    fn test_router() -> Router {
        router(AppState {
            handler: UserHandler::new(Arc::new(InMemoryUserRepository::new())),
            request_timeout: Duration::from_secs(5),
        })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, HeaderMap, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn router_creates_then_reads_user_ignoring_query_string() {
        let app = test_router();

        let (status, headers, created) = send(
            &app,
            Method::POST,
            "/users",
            r#"{"name":"Alice","email":"alice@x.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(created, json!({"id": 1, "name": "Alice", "email": "alice@x.com"}));

        let (status, _, fetched) = send(&app, Method::GET, "/users/1?x=y", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn router_rejects_unsupported_method_with_allow_header() {
        let app = test_router();

        let (status, headers, body) = send(&app, Method::PATCH, "/users/1", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[header::ALLOW], "GET, PUT, DELETE");
        assert_eq!(body["error"]["code"], "method_not_allowed");
    }

    #[tokio::test]
    async fn router_returns_json_404_for_unknown_path() {
        let app = test_router();

        let (status, headers, body) = send(&app, Method::GET, "/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(body["error"]["code"], "route_not_found");
    }

    #[test]
    fn dropping_guard_cancels_token() {
        let token = CancellationToken::new();
        drop(CancelOnDrop(token.clone()));
        assert!(token.is_cancelled());
    }

    #[test]
    fn into_axum_copies_status_and_allow_header() {
        let response = into_axum(ApiError::MethodNotAllowed { allow: "GET, POST" }.into_response());

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
