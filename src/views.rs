//! Read-only projections of a [`ProjectSnapshot`].
//!
//! Everything here is a pure function of the snapshot and is recomputed from
//! scratch whenever the board changes. Calling a projection twice on the same
//! snapshot yields the same result.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::*;

/// Story counts and point sums over a set of stories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub blocked: usize,
    /// Number of stories counted.
    pub total: usize,
    pub total_points: u64,
    pub completed_points: u64,
}

impl ProjectStats {
    fn from_stories<'a>(stories: impl Iterator<Item = &'a Story>) -> Self {
        let mut stats = Self::default();
        for story in stories {
            match story.status {
                StoryStatus::Todo => stats.todo += 1,
                StoryStatus::InProgress => stats.in_progress += 1,
                StoryStatus::Done => stats.done += 1,
                StoryStatus::Blocked => stats.blocked += 1,
            }
            stats.total += 1;
            stats.total_points += u64::from(story.story_points);
            if story.status == StoryStatus::Done {
                stats.completed_points += u64::from(story.story_points);
            }
        }
        stats
    }

    /// Completed points as a rounded percentage of all points; 0 when there are none.
    pub fn progress_percent(&self) -> u32 {
        if self.total_points == 0 {
            return 0;
        }
        ((self.completed_points as f64 / self.total_points as f64) * 100.0).round() as u32
    }
}

/// Aggregate over every sprint.
pub fn project_stats(snapshot: &ProjectSnapshot) -> ProjectStats {
    ProjectStats::from_stories(snapshot.stories())
}

/// Aggregate over one sprint, or `None` if it does not exist.
pub fn sprint_stats(snapshot: &ProjectSnapshot, sprint_id: &str) -> Option<ProjectStats> {
    snapshot
        .sprint(sprint_id)
        .map(|s| ProjectStats::from_stories(s.stories.iter()))
}

/// Each epic with `total` recomputed as the sum of points of stories naming it,
/// across all sprints. Epic order is preserved.
pub fn epic_totals(snapshot: &ProjectSnapshot) -> Vec<Epic> {
    let mut points: HashMap<&str, u32> = HashMap::new();
    for story in snapshot.stories() {
        *points.entry(story.epic_name.as_str()).or_default() += story.story_points;
    }

    snapshot
        .epics()
        .iter()
        .map(|epic| Epic {
            total: points.get(epic.name.as_str()).copied().unwrap_or(0),
            ..epic.clone()
        })
        .collect()
}

/// Sum of points of every story naming epic `name`.
pub fn points_for_epic(snapshot: &ProjectSnapshot, name: &str) -> u32 {
    snapshot
        .stories()
        .filter(|s| s.epic_name == name)
        .map(|s| s.story_points)
        .sum()
}

/// A Kanban column on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    pub const ALL: [Column; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Column a story is displayed in. Blocked stories share the in-progress column.
    pub fn for_status(status: StoryStatus) -> Self {
        match status {
            StoryStatus::Todo => Self::Todo,
            StoryStatus::InProgress | StoryStatus::Blocked => Self::InProgress,
            StoryStatus::Done => Self::Done,
        }
    }

    /// Status a story gets when dropped onto this column.
    pub fn status(self) -> StoryStatus {
        match self {
            Self::Todo => StoryStatus::Todo,
            Self::InProgress => StoryStatus::InProgress,
            Self::Done => StoryStatus::Done,
        }
    }

    pub fn id(self) -> &'static str {
        self.status().as_str()
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// A story as shown inside a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView<'a> {
    pub story: &'a Story,
    /// Rendered with the blocked treatment.
    pub blocked: bool,
}

/// One column and its cards, in sprint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView<'a> {
    pub column: Column,
    pub cards: Vec<CardView<'a>>,
}

/// Which stories of a sprint are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EpicFilter {
    #[default]
    All,
    Epic(String),
}

impl EpicFilter {
    pub fn matches(&self, story: &Story) -> bool {
        match self {
            Self::All => true,
            Self::Epic(name) => story.epic_name == *name,
        }
    }
}

/// Stories of `sprint` passing `filter`, in sprint order.
pub fn filter_stories<'a>(sprint: &'a Sprint, filter: &EpicFilter) -> Vec<&'a Story> {
    sprint.stories.iter().filter(|s| filter.matches(s)).collect()
}

/// Bucket the (filtered) stories of a sprint into the three board columns.
pub fn board_columns<'a>(sprint: &'a Sprint, filter: &EpicFilter) -> [ColumnView<'a>; 3] {
    let mut columns = Column::ALL.map(|column| ColumnView {
        column,
        cards: Vec::new(),
    });
    for story in filter_stories(sprint, filter) {
        let column = Column::for_status(story.status);
        if let Some(view) = columns.iter_mut().find(|v| v.column == column) {
            view.cards.push(CardView {
                story,
                blocked: story.status == StoryStatus::Blocked,
            });
        }
    }
    columns
}
