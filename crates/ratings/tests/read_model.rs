//! Read model behavior over the in-memory session.

use std::time::Duration;

use futures_util::future::join_all;
use ratings::{
    InMemorySession, RatingsError, RatingsReadModel, Row, UserId, UserVideoRating, Value,
    VideoId, VideoRating,
};

fn setup() -> (RatingsReadModel<InMemorySession>, InMemorySession) {
    let session = InMemorySession::new();
    (RatingsReadModel::new(session.clone()), session)
}

#[tokio::test]
async fn unrated_video_reads_as_zero() {
    let (model, _) = setup();
    let v1 = VideoId::new();

    let rating = model.get_rating(v1).await.unwrap();

    assert_eq!(
        rating,
        VideoRating {
            video_id: v1,
            ratings_count: 0,
            ratings_total: 0
        }
    );
}

#[tokio::test]
async fn rated_video_copies_counters_verbatim() {
    let (model, session) = setup();
    let v1 = VideoId::new();
    session.set_video_rating(v1, 5, 21).await;

    let rating = model.get_rating(v1).await.unwrap();

    assert_eq!(
        rating,
        VideoRating {
            video_id: v1,
            ratings_count: 5,
            ratings_total: 21
        }
    );
}

#[tokio::test]
async fn large_counters_are_not_truncated() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    session
        .set_video_rating(video_id, i64::from(i32::MAX) + 10, i64::MAX)
        .await;

    let rating = model.get_rating(video_id).await.unwrap();
    assert_eq!(rating.ratings_count, i64::from(i32::MAX) + 10);
    assert_eq!(rating.ratings_total, i64::MAX);
}

#[tokio::test]
async fn user_without_rating_reads_as_zero() {
    let (model, session) = setup();
    let v1 = VideoId::new();
    let u1 = UserId::new();
    // Another user's rating must not leak into U1's answer
    session.set_user_rating(v1, UserId::new(), 5).await;

    let rating = model.get_rating_from_user(v1, u1).await.unwrap();

    assert_eq!(
        rating,
        UserVideoRating {
            video_id: v1,
            user_id: u1,
            rating: 0
        }
    );
}

#[tokio::test]
async fn user_rating_is_returned_exactly() {
    let (model, session) = setup();
    let v1 = VideoId::new();
    let u1 = UserId::new();
    session.set_user_rating(v1, u1, 4).await;

    let rating = model.get_rating_from_user(v1, u1).await.unwrap();

    assert_eq!(
        rating,
        UserVideoRating {
            video_id: v1,
            user_id: u1,
            rating: 4
        }
    );
}

#[tokio::test]
async fn parameters_are_bound_in_video_user_order() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    let user_id = UserId::new();
    session.set_user_rating(video_id, user_id, 3).await;

    // Swapping the ids must not find the row
    let swapped = model
        .get_rating_from_user(
            VideoId::from_uuid(user_id.as_uuid()),
            UserId::from_uuid(video_id.as_uuid()),
        )
        .await
        .unwrap();
    assert_eq!(swapped.rating, 0);
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    let user_id = UserId::new();
    session.set_video_rating(video_id, 3, 12).await;
    session.set_user_rating(video_id, user_id, 5).await;

    let first = model.get_rating(video_id).await.unwrap();
    let second = model.get_rating(video_id).await.unwrap();
    assert_eq!(first, second);

    let first = model.get_rating_from_user(video_id, user_id).await.unwrap();
    let second = model.get_rating_from_user(video_id, user_id).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(session.prepare_count(), 2);
    assert_eq!(session.execute_count(), 4);
}

#[tokio::test]
async fn concurrent_first_calls_prepare_once() {
    let session = InMemorySession::new().with_prepare_delay(Duration::from_millis(25));
    let model = RatingsReadModel::new(session.clone());
    let video_id = VideoId::new();
    session.set_video_rating(video_id, 2, 9).await;

    let results = join_all((0..16).map(|_| model.get_rating(video_id))).await;

    assert_eq!(session.prepare_count(), 1);
    for result in results {
        assert_eq!(result.unwrap().ratings_total, 9);
    }
}

#[tokio::test]
async fn statements_are_prepared_independently() {
    let (model, session) = setup();
    let video_id = VideoId::new();

    model.get_rating(video_id).await.unwrap();
    assert_eq!(session.prepare_count(), 1);

    model
        .get_rating_from_user(video_id, UserId::new())
        .await
        .unwrap();
    assert_eq!(session.prepare_count(), 2);
}

#[tokio::test]
async fn connectivity_failure_propagates() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    session.set_video_rating(video_id, 1, 5).await;
    session.set_unavailable(true);

    let rating = model.get_rating(video_id).await;
    assert!(matches!(rating, Err(RatingsError::Unavailable(_))));

    let user_rating = model.get_rating_from_user(video_id, UserId::new()).await;
    assert!(matches!(user_rating, Err(RatingsError::Unavailable(_))));
}

#[tokio::test]
async fn execution_failure_after_preparation_propagates() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    model.get_rating(video_id).await.unwrap();

    session.set_unavailable(true);
    assert!(matches!(
        model.get_rating(video_id).await,
        Err(RatingsError::Unavailable(_))
    ));

    session.set_unavailable(false);
    assert_eq!(session.prepare_count(), 1);
    assert!(model.get_rating(video_id).await.is_ok());
}

#[tokio::test]
async fn failed_preparation_is_retried_on_next_call() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    session.set_video_rating(video_id, 1, 4).await;
    session.fail_next_prepares(1);

    assert!(matches!(
        model.get_rating(video_id).await,
        Err(RatingsError::Prepare { .. })
    ));

    let rating = model.get_rating(video_id).await.unwrap();
    assert_eq!(rating.ratings_count, 1);
    assert_eq!(session.prepare_count(), 2);
}

#[tokio::test]
async fn duplicate_rows_are_reported() {
    let (model, session) = setup();
    let video_id = VideoId::new();
    for _ in 0..2 {
        let row = Row::new()
            .with("videoid", video_id)
            .with("rating_counter", Value::Counter(1))
            .with("rating_total", Value::Counter(1));
        assert!(session.insert_row("video_ratings", row).await);
    }

    assert!(matches!(
        model.get_rating(video_id).await,
        Err(RatingsError::UnexpectedRowCount(2))
    ));
}

#[tokio::test]
async fn builder_requires_session() {
    let missing = RatingsReadModel::<InMemorySession>::builder().build();
    assert!(matches!(missing, Err(RatingsError::MissingSession)));

    let model = RatingsReadModel::builder()
        .session(InMemorySession::new())
        .build()
        .unwrap();
    assert_eq!(model.session().prepare_count(), 0);
}
