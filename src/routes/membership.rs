use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::WatchEvent,
    services::membership::MembershipStatus,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    email: Option<String>,
}

/// Handler for OTP issuance
pub async fn send_otp(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Json(request): Json<SendOtpRequest>,
) -> AppResult<Json<Value>> {
    let email = request
        .email
        .ok_or_else(|| AppError::Validation("email is required".to_string()))?;

    state.otp.issue(&username, &email).await?;

    Ok(Json(json!({ "msg": "otp sent to email" })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    email: Option<String>,
    otp: Option<String>,
}

/// Handler for OTP verification; success activates premium membership
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (Some(email), Some(otp)) = (request.email, request.otp) else {
        return Err(AppError::Validation("email and otp are required".to_string()));
    };

    state.otp.verify(&username, &email, &otp).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "premium membership activated" })),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watched_movies: Option<Vec<WatchEvent>>,
}

/// Handler for the membership dashboard
pub async fn subscriptions(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
) -> AppResult<Json<DashboardResponse>> {
    let response = match state.membership.get_status(&username).await? {
        MembershipStatus::Free => DashboardResponse {
            is_premium: false,
            score: None,
            watched_movies: None,
        },
        MembershipStatus::Premium {
            score,
            watched_movies,
        } => DashboardResponse {
            is_premium: true,
            score: Some(score),
            watched_movies: Some(watched_movies),
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct UpdateScoreRequest {
    // Trusts the caller-supplied username rather than the bearer identity;
    // the handler logs both so misuse is traceable.
    username: Option<String>,
    score: Option<i64>,
}

/// Handler for score updates
pub async fn update_score(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(request): Json<UpdateScoreRequest>,
) -> AppResult<Json<Value>> {
    let username = request
        .username
        .ok_or_else(|| AppError::Validation("username is required".to_string()))?;
    let delta = request
        .score
        .ok_or_else(|| AppError::Validation("score is required".to_string()))?;

    if caller != username {
        tracing::warn!(
            caller = %caller,
            target = %username,
            "score update targets another user"
        );
    }

    let new_score = state.membership.add_score(&username, delta).await?;

    Ok(Json(json!({
        "msg": "score updated",
        "username": username,
        "score": new_score,
    })))
}
