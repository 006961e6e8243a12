//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that resolves the bearer token through the identity provider
/// and injects the resulting `CallerContext` into request extensions.
///
/// The caller's plan and free-usage counter are read fresh on every request;
/// nothing identity-related is cached in-process. Missing or invalid identity
/// is rejected here and never reaches the core.
pub async fn require_caller(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    // 2. Resolve it through the identity provider
    let caller = state
        .pipeline
        .identity
        .caller_context(token)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to resolve caller identity");
            ApiError::Unauthenticated
        })?;

    // 3. Make the caller available to the handler
    req.extensions_mut().insert(caller);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
