//! Identifier types shared by the ratings crates.

mod types;

pub use types::{UserId, VideoId};
