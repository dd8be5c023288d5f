//! Prepare-once statement caching.

use tokio::sync::OnceCell;

use crate::{Result, Session};

/// Aggregate tally for one video.
pub const VIDEO_RATING_QUERY: &str = "SELECT * FROM video_ratings WHERE videoid = ?";

/// One user's rating of one video.
pub const USER_RATING_QUERY: &str =
    "SELECT rating FROM video_ratings_by_user WHERE videoid = ? AND userid = ?";

/// A query template that is prepared on first use and shared afterwards.
///
/// At most one preparation runs at a time: callers arriving while it is in
/// flight wait for it and then observe the same handle. A failed preparation
/// is not remembered, so the next caller prepares again.
pub struct LazyStatement<P> {
    query: &'static str,
    cell: OnceCell<P>,
}

impl<P> LazyStatement<P> {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            cell: OnceCell::new(),
        }
    }

    pub fn query(&self) -> &'static str {
        self.query
    }

    /// Returns the prepared handle if preparation already completed.
    pub fn get(&self) -> Option<&P> {
        self.cell.get()
    }

    pub fn is_prepared(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the prepared handle, preparing it on `session` if needed.
    pub async fn get_or_prepare<S>(&self, session: &S) -> Result<&P>
    where
        S: Session<Prepared = P>,
    {
        self.cell
            .get_or_try_init(|| async {
                match session.prepare(self.query).await {
                    Ok(prepared) => {
                        metrics::counter!("ratings_statements_prepared_total").increment(1);
                        tracing::debug!(query = self.query, "statement prepared");
                        Ok(prepared)
                    }
                    Err(e) => {
                        tracing::warn!(query = self.query, error = %e, "statement preparation failed");
                        Err(e)
                    }
                }
            })
            .await
    }
}

impl<P> std::fmt::Debug for LazyStatement<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyStatement")
            .field("query", &self.query)
            .field("prepared", &self.is_prepared())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{InMemorySession, RatingsError};

    #[tokio::test]
    async fn prepares_on_first_use_only() {
        let session = InMemorySession::new();
        let statement = LazyStatement::new(VIDEO_RATING_QUERY);
        assert!(!statement.is_prepared());

        statement.get_or_prepare(&session).await.unwrap();
        statement.get_or_prepare(&session).await.unwrap();

        assert!(statement.is_prepared());
        assert_eq!(session.prepare_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_access_prepares_once() {
        let session = InMemorySession::new().with_prepare_delay(Duration::from_millis(20));
        let statement = LazyStatement::new(USER_RATING_QUERY);

        let handles = futures_util::future::join_all(
            (0..8).map(|_| statement.get_or_prepare(&session)),
        )
        .await;

        let first = handles[0].as_ref().unwrap();
        for handle in &handles {
            assert!(std::ptr::eq(*handle.as_ref().unwrap(), *first));
        }
        assert_eq!(session.prepare_count(), 1);
    }

    #[tokio::test]
    async fn failed_preparation_is_retried() {
        let session = InMemorySession::new();
        session.fail_next_prepares(1);
        let statement = LazyStatement::new(VIDEO_RATING_QUERY);

        let first = statement.get_or_prepare(&session).await;
        assert!(matches!(first, Err(RatingsError::Prepare { .. })));
        assert!(!statement.is_prepared());

        statement.get_or_prepare(&session).await.unwrap();
        assert!(statement.is_prepared());
        assert_eq!(session.prepare_count(), 2);
    }

    #[tokio::test]
    async fn malformed_query_fails_to_prepare() {
        let session = InMemorySession::new();
        let statement: LazyStatement<_> = LazyStatement::new("SELEKT rating FROM nowhere");

        let result = statement.get_or_prepare(&session).await;
        assert!(matches!(result, Err(RatingsError::Prepare { .. })));
    }
}
