use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    services::group_watch::MediaRef,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRequest {
    media_kind: Option<String>,
    media_id: Option<String>,
}

impl MediaRequest {
    fn into_fields(self) -> AppResult<(String, String)> {
        let (Some(media_kind), Some(media_id)) = (self.media_kind, self.media_id) else {
            return Err(AppError::Validation(
                "mediaKind and mediaId are required".to_string(),
            ));
        };
        if media_kind.is_empty() || media_id.is_empty() {
            return Err(AppError::Validation(
                "mediaKind and mediaId are required".to_string(),
            ));
        }
        Ok((media_kind, media_id))
    }
}

/// Handler for recording a watch event
pub async fn watched(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Json(request): Json<MediaRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (media_kind, media_id) = request.into_fields()?;

    state
        .watch_history
        .record(&username, &media_kind, &media_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "watch event recorded" })),
    ))
}

/// Handler for joining the group-watch list
pub async fn watch_together(
    State(state): State<AppState>,
    Extension(CurrentUser(username)): Extension<CurrentUser>,
    Json(request): Json<MediaRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (media_kind, media_id) = request.into_fields()?;

    state
        .group_watch
        .request_join(&username, &media_kind, &media_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "added to watch together list" })),
    ))
}

/// Handler for the active group-watch list
pub async fn watch_together_list(
    State(state): State<AppState>,
) -> AppResult<Json<HashMap<String, Vec<MediaRef>>>> {
    let active = state.group_watch.list_active().await?;
    Ok(Json(active))
}
