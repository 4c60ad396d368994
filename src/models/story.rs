use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of work on the board.
///
/// Stories do not record which sprint owns them; ownership is positional
/// (the sprint whose `stories` list contains the story). Use
/// [`ProjectSnapshot::owner_of`](super::ProjectSnapshot::owner_of) to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Stable id such as `SPK-12`. Unique across the whole snapshot.
    pub id: String,
    pub title: String,
    pub status: StoryStatus,
    /// Story points. Always positive.
    #[serde(rename = "sp")]
    pub story_points: u32,
    /// Name of the epic this story belongs to (epics are referenced by name, not id).
    #[serde(rename = "epic")]
    pub epic_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Fields the board does not model (e.g. `priority`), written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The workflow status of a story.
///
/// Clicking a story advances it through a fixed cycle:
/// `Todo → InProgress → Done → Blocked → Todo`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl StoryStatus {
    pub const ALL: [StoryStatus; 4] = [Self::Todo, Self::InProgress, Self::Done, Self::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// The next status in the click-to-advance cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Blocked,
            Self::Blocked => Self::Todo,
        }
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the numeric suffix of a story id carrying `prefix`.
///
/// Returns `None` for ids that do not follow the `<prefix><digits>` pattern.
pub fn story_number(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}
