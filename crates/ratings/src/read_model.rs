//! The ratings read model.

use std::time::Instant;

use common::{UserId, VideoId};

use crate::{
    BoundStatement, LazyStatement, RatingsError, Result, Row, Session, USER_RATING_QUERY,
    UserVideoRating, VIDEO_RATING_QUERY, VideoRating,
};

/// Reads video rating tallies and per-user ratings.
///
/// Both queries are prepared lazily on first use and reused for the lifetime
/// of the read model. Every failure raised by the session is returned to the
/// caller as is; a missing row is not a failure and maps to zero values.
pub struct RatingsReadModel<S: Session> {
    session: S,
    video_rating: LazyStatement<S::Prepared>,
    user_rating: LazyStatement<S::Prepared>,
}

impl<S: Session> RatingsReadModel<S> {
    /// Creates a read model over `session`. No statement is prepared yet.
    pub fn new(session: S) -> Self {
        Self {
            session,
            video_rating: LazyStatement::new(VIDEO_RATING_QUERY),
            user_rating: LazyStatement::new(USER_RATING_QUERY),
        }
    }

    /// Starts building a read model.
    pub fn builder() -> RatingsReadModelBuilder<S> {
        RatingsReadModelBuilder::default()
    }

    /// Returns a reference to the underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Number of statements prepared so far (0 to 2).
    pub fn prepared_statements(&self) -> usize {
        [&self.video_rating, &self.user_rating]
            .iter()
            .filter(|s| s.is_prepared())
            .count()
    }

    /// Gets the current rating tally for a video.
    ///
    /// A video nobody has rated has no row and reads as `{video_id, 0, 0}`.
    #[tracing::instrument(skip(self))]
    pub async fn get_rating(&self, video_id: VideoId) -> Result<VideoRating> {
        let started = Instant::now();
        let result = self.fetch_rating(video_id).await;
        record_read("get_rating", started, result.is_ok());
        result
    }

    /// Gets the rating a user gave a video, `0` if they have not rated it.
    #[tracing::instrument(skip(self))]
    pub async fn get_rating_from_user(
        &self,
        video_id: VideoId,
        user_id: UserId,
    ) -> Result<UserVideoRating> {
        let started = Instant::now();
        let result = self.fetch_rating_from_user(video_id, user_id).await;
        record_read("get_rating_from_user", started, result.is_ok());
        result
    }

    async fn fetch_rating(&self, video_id: VideoId) -> Result<VideoRating> {
        let prepared = self.video_rating.get_or_prepare(&self.session).await?;
        let rows = self
            .session
            .execute(BoundStatement::new(prepared, vec![video_id.into()]))
            .await?;

        // A video without ratings has no row yet
        let row = rows.single_or_none()?;
        map_video_rating(row.as_ref(), video_id)
    }

    async fn fetch_rating_from_user(
        &self,
        video_id: VideoId,
        user_id: UserId,
    ) -> Result<UserVideoRating> {
        let prepared = self.user_rating.get_or_prepare(&self.session).await?;
        let rows = self
            .session
            .execute(BoundStatement::new(
                prepared,
                vec![video_id.into(), user_id.into()],
            ))
            .await?;

        let row = rows.single_or_none()?;
        map_user_video_rating(row.as_ref(), video_id, user_id)
    }
}

impl<S: Session> std::fmt::Debug for RatingsReadModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingsReadModel")
            .field("video_rating", &self.video_rating)
            .field("user_rating", &self.user_rating)
            .finish_non_exhaustive()
    }
}

fn record_read(operation: &'static str, started: Instant, ok: bool) {
    metrics::counter!("ratings_reads_total", "operation" => operation).increment(1);
    metrics::histogram!("ratings_read_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
    if !ok {
        metrics::counter!("ratings_read_errors_total", "operation" => operation).increment(1);
    }
}

/// Maps an optional `video_ratings` row to a [`VideoRating`].
///
/// `None` yields the zero tally. Null counters read as zero, matching a
/// counter column that was never incremented.
pub fn map_video_rating(row: Option<&Row>, video_id: VideoId) -> Result<VideoRating> {
    let Some(row) = row else {
        return Ok(VideoRating::unrated(video_id));
    };

    Ok(VideoRating {
        video_id,
        ratings_count: row.get_i64("rating_counter")?.unwrap_or_default(),
        ratings_total: row.get_i64("rating_total")?.unwrap_or_default(),
    })
}

/// Maps an optional `video_ratings_by_user` row to a [`UserVideoRating`].
pub fn map_user_video_rating(
    row: Option<&Row>,
    video_id: VideoId,
    user_id: UserId,
) -> Result<UserVideoRating> {
    let rating = match row {
        Some(row) => row.get_i32("rating")?.unwrap_or_default(),
        None => 0,
    };

    Ok(UserVideoRating {
        video_id,
        user_id,
        rating,
    })
}

/// Builder for [`RatingsReadModel`].
pub struct RatingsReadModelBuilder<S> {
    session: Option<S>,
}

impl<S> Default for RatingsReadModelBuilder<S> {
    fn default() -> Self {
        Self { session: None }
    }
}

impl<S: Session> RatingsReadModelBuilder<S> {
    /// Sets the session the read model queries.
    pub fn session(mut self, session: S) -> Self {
        self.session = Some(session);
        self
    }

    /// Builds the read model.
    ///
    /// Fails with [`RatingsError::MissingSession`] if no session was set.
    pub fn build(self) -> Result<RatingsReadModel<S>> {
        let session = self.session.ok_or(RatingsError::MissingSession)?;
        Ok(RatingsReadModel::new(session))
    }
}
