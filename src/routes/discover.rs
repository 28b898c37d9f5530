use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDescriptionRequest {
    movie_name: Option<String>,
    release_date: Option<String>,
}

/// Handler for generated movie descriptions
pub async fn movie_description(
    State(state): State<AppState>,
    Json(request): Json<MovieDescriptionRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (Some(movie_name), Some(release_date)) = (request.movie_name, request.release_date) else {
        return Err(AppError::Validation(
            "movieName and releaseDate are required".to_string(),
        ));
    };

    let description = state.describe.describe(&movie_name, &release_date).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "movieName": movie_name,
            "releaseDate": release_date,
            "description": description,
        })),
    ))
}

/// Handler for movie quiz generation
pub async fn quiz(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let payload = state.quiz.generate(&username).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "username": username,
            "quiz": payload.quiz,
        })),
    ))
}
