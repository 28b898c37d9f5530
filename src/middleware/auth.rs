use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// The authenticated username, stored in request extensions by
/// [`require_bearer`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// Rejects requests without a valid bearer token and exposes the token's
/// subject to handlers as [`CurrentUser`].
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("missing bearer token".to_string()))?;

    let claims = state.tokens.verify(token)?;
    request.extensions_mut().insert(CurrentUser(claims.sub));

    Ok(next.run(request).await)
}
