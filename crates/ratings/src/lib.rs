//! Read access to the video rating tables.
//!
//! This crate is the query side for video ratings:
//! - [`Session`] trait abstracting a connection that prepares and executes statements
//! - [`RatingsReadModel`] serving the per-video tally and the per-user rating
//! - [`LazyStatement`] for prepare-once statement caching
//! - Two session backends: [`ScyllaSession`] and [`InMemorySession`]

pub mod error;
pub mod memory;
pub mod rating;
pub mod read_model;
pub mod row;
pub mod scylladb;
pub mod session;
pub mod statement;

pub use common::{UserId, VideoId};
pub use error::{RatingsError, Result};
pub use memory::{InMemorySession, InMemoryStatement};
pub use rating::{UserVideoRating, VideoRating};
pub use read_model::{
    RatingsReadModel, RatingsReadModelBuilder, map_user_video_rating, map_video_rating,
};
pub use row::{Row, RowSet, Value};
pub use scylladb::{ScyllaConfig, ScyllaSession};
pub use session::{BoundStatement, Session};
pub use statement::{LazyStatement, USER_RATING_QUERY, VIDEO_RATING_QUERY};
