//! Domain models for the scrum board.
//!
//! # Core Concepts
//!
//! - [`Sprint`]: An iteration holding an ordered list of stories. The
//!   `backlog` and `discovery` ids are reserved pools.
//! - [`Story`]: A unit of work. Owned by exactly one sprint at a time.
//! - [`Epic`]: A theme stories refer to by name. Its point total is derived.
//! - [`Assignee`]: Read-only list of people stories can be assigned to.
//! - [`ProjectSnapshot`]: Everything above, as one value.

mod epic;
mod snapshot;
mod sprint;
mod story;

pub use epic::*;
pub use snapshot::*;
pub use sprint::*;
pub use story::*;

use serde::{Deserialize, Serialize};

/// A person stories can be assigned to. Never mutated by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: String,
    pub name: String,
}

/// Body of `PATCH /settings`: the high-water mark of generated story ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryCounter {
    #[serde(rename = "lastStoryId")]
    pub last_story_id: u64,
}

/// The shared credentials published at `GET /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub user: String,
    pub password: String,
}
