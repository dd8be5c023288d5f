//! Video rating read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{UserId, VideoId};
use ratings::{RatingsReadModel, Session, UserVideoRating, VideoRating};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Session> {
    pub read_model: RatingsReadModel<S>,
}

/// GET /videos/:video_id/rating — aggregate rating tally for a video.
#[tracing::instrument(skip(state))]
pub async fn video<S: Session + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoRating>, ApiError> {
    let video_id = parse_video_id(&video_id)?;
    let rating = state.read_model.get_rating(video_id).await?;
    Ok(Json(rating))
}

/// GET /videos/:video_id/ratings/:user_id — the rating a user gave a video.
#[tracing::instrument(skip(state))]
pub async fn from_user<S: Session + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((video_id, user_id)): Path<(String, String)>,
) -> Result<Json<UserVideoRating>, ApiError> {
    let video_id = parse_video_id(&video_id)?;
    let user_id: UserId = user_id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid user_id: {e}")))?;
    let rating = state
        .read_model
        .get_rating_from_user(video_id, user_id)
        .await?;
    Ok(Json(rating))
}

fn parse_video_id(id: &str) -> Result<VideoId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid video_id: {e}")))
}
