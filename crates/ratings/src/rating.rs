//! Rating projections returned to callers.

use common::{UserId, VideoId};
use serde::{Deserialize, Serialize};

/// Aggregate rating tally for one video.
///
/// `ratings_total >= ratings_count` holds under normal use since every rating
/// contributes at least one point, but nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRating {
    pub video_id: VideoId,
    pub ratings_count: i64,
    pub ratings_total: i64,
}

impl VideoRating {
    /// The tally of a video nobody has rated yet.
    pub fn unrated(video_id: VideoId) -> Self {
        Self {
            video_id,
            ratings_count: 0,
            ratings_total: 0,
        }
    }
}

/// The rating one user gave one video. `rating == 0` means no rating was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVideoRating {
    pub video_id: VideoId,
    pub user_id: UserId,
    pub rating: i32,
}

impl UserVideoRating {
    pub fn unrated(video_id: VideoId, user_id: UserId) -> Self {
        Self {
            video_id,
            user_id,
            rating: 0,
        }
    }
}
