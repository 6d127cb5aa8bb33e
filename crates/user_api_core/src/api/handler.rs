//! User request dispatch.
//!
//! # Responsibility
//! - Map `(method, path, body)` to repository calls.
//! - Validate write payloads before they reach the repository.
//!
//! # Invariants
//! - Method is checked before the item id is parsed.
//! - `/health` never touches the repository.

use crate::api::response::{ApiError, ApiResponse};
use crate::api::route::{parse_user_id, IdError, Route};
use crate::context::RequestContext;
use crate::model::user::{UserId, UserInput};
use crate::repo::UserRepository;
use http::{Method, StatusCode};
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

type ApiResult = Result<ApiResponse, ApiError>;

/// Dispatches user-service requests to an injected repository.
#[derive(Clone)]
pub struct UserHandler {
    repo: Arc<dyn UserRepository>,
}

impl UserHandler {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Handles one request and logs its outcome.
    ///
    /// `path` must not include the query string.
    pub fn handle(
        &self,
        ctx: &RequestContext,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> ApiResponse {
        let started_at = Instant::now();
        let response = self
            .dispatch(ctx, method, path, body)
            .unwrap_or_else(ApiError::into_response);

        let duration_ms = started_at.elapsed().as_millis();
        let code = response.status.as_u16();
        if response.status.is_server_error() {
            error!(
                "event=http_request module=api status=error method={} path={} code={} duration_ms={}",
                method, path, code, duration_ms
            );
        } else if response.status.is_client_error() {
            warn!(
                "event=http_request module=api status=rejected method={} path={} code={} duration_ms={}",
                method, path, code, duration_ms
            );
        } else {
            info!(
                "event=http_request module=api status=ok method={} path={} code={} duration_ms={}",
                method, path, code, duration_ms
            );
        }

        response
    }

    fn dispatch(
        &self,
        ctx: &RequestContext,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> ApiResult {
        let route = Route::resolve(path).ok_or_else(|| ApiError::RouteNotFound(path.to_string()))?;

        match (route, method) {
            (Route::Health, &Method::GET) => Ok(health()),
            (Route::Users, &Method::GET) => self.list_users(ctx),
            (Route::Users, &Method::POST) => self.create_user(ctx, body),
            (Route::User(raw), &Method::GET) => self.get_user(ctx, user_id(raw)?),
            (Route::User(raw), &Method::PUT) => self.update_user(ctx, user_id(raw)?, body),
            (Route::User(raw), &Method::DELETE) => self.delete_user(ctx, user_id(raw)?),
            (route, _) => Err(ApiError::MethodNotAllowed {
                allow: route.allowed_methods(),
            }),
        }
    }

    fn list_users(&self, ctx: &RequestContext) -> ApiResult {
        let users = self.repo.list_users(ctx)?;
        Ok(ApiResponse::json(StatusCode::OK, &users))
    }

    fn create_user(&self, ctx: &RequestContext, body: &[u8]) -> ApiResult {
        let input = decode_input(body)?;
        let user = self.repo.create_user(ctx, &input)?;
        info!("event=user_create module=api status=ok user_id={}", user.id);
        Ok(ApiResponse::json(StatusCode::CREATED, &user))
    }

    fn get_user(&self, ctx: &RequestContext, id: UserId) -> ApiResult {
        let user = self.repo.get_user(ctx, id)?;
        Ok(ApiResponse::json(StatusCode::OK, &user))
    }

    fn update_user(&self, ctx: &RequestContext, id: UserId, body: &[u8]) -> ApiResult {
        let input = decode_input(body)?;
        let user = self.repo.update_user(ctx, id, &input)?;
        Ok(ApiResponse::json(StatusCode::OK, &user))
    }

    fn delete_user(&self, ctx: &RequestContext, id: UserId) -> ApiResult {
        self.repo.delete_user(ctx, id)?;
        Ok(ApiResponse::new(
            StatusCode::OK,
            json!({ "message": "user deleted", "id": id }),
        ))
    }
}

fn health() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, json!({ "status": "ok" }))
}

fn user_id(raw: &str) -> Result<UserId, ApiError> {
    parse_user_id(raw).map_err(|err| match err {
        IdError::Missing => ApiError::MalformedRequest("missing user id".to_string()),
        IdError::NotNumeric(raw) => {
            ApiError::MalformedRequest(format!("invalid user id `{raw}`"))
        }
    })
}

/// Decodes and normalizes a write payload.
fn decode_input(body: &[u8]) -> Result<UserInput, ApiError> {
    let input: UserInput = serde_json::from_slice(body)
        .map_err(|err| ApiError::MalformedRequest(format!("invalid JSON body: {err}")))?;
    input
        .normalized()
        .map_err(|err| ApiError::Validation(err.to_string()))
}
