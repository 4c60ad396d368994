use serde::{Deserialize, Serialize};

use super::story::Story;

/// Reserved id of the backlog pseudo-sprint.
pub const BACKLOG_ID: &str = "backlog";

/// Reserved id of the discovery pool.
pub const DISCOVERY_ID: &str = "discovery";

/// A time-boxed iteration holding an ordered list of stories.
///
/// Two ids are reserved pools rather than real iterations:
/// - `backlog`: stories are forced to `todo`, and the sprint can be neither
///   edited nor deleted.
/// - `discovery`: stories are forced to `todo`, otherwise an ordinary sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    /// Free-form date range label, e.g. `Feb 01 - Feb 14`.
    #[serde(rename = "weeks", default)]
    pub date_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SprintStatus>,
    #[serde(default)]
    pub stories: Vec<Story>,
}

impl Sprint {
    pub fn is_backlog(&self) -> bool {
        self.id == BACKLOG_ID
    }

    /// Whether stories placed in this sprint must stay in `todo`.
    pub fn forces_todo(&self) -> bool {
        is_pool(&self.id)
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(SprintStatus::Active)
    }

    pub fn position_of(&self, story_id: &str) -> Option<usize> {
        self.stories.iter().position(|s| s.id == story_id)
    }

    pub fn story(&self, story_id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == story_id)
    }
}

/// Whether `sprint_id` names one of the todo-only pools.
pub fn is_pool(sprint_id: &str) -> bool {
    sprint_id == BACKLOG_ID || sprint_id == DISCOVERY_ID
}

/// The scheduling status of a sprint. At most one sprint is `Active`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Active,
    Planned,
    Completed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Planned => "planned",
            Self::Completed => "completed",
        }
    }
}
