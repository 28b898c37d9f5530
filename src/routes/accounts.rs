use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (Some(name), Some(username), Some(password)) =
        (request.name, request.username, request.password)
    else {
        return Err(AppError::Validation("all fields are required".to_string()));
    };
    if name.is_empty() || username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("all fields are required".to_string()));
    }

    state.auth.register(&name, &username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "user registered successfully" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    access_token: String,
    is_premium: bool,
}

/// Handler for login: returns a bearer token plus membership flags
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AppError::Validation("all fields are required".to_string()));
    };
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("all fields are required".to_string()));
    }

    let outcome = state.auth.login(&username, &password).await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
        is_premium: outcome.is_premium,
    }))
}
