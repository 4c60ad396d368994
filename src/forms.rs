//! Editor state for stories, epics and sprints.
//!
//! A form is opened either for create (fields reset to defaults) or for edit
//! (fields copied from the target entity). Submitting packages the fields into
//! a [`Command`] and closes the modal right away; the outcome of persisting is
//! reported by the board, not by the form.

use crate::board::{new_entity_id, Command, EpicDraft, SprintDraft, StoryDraft};
use crate::models::*;

/// Story points of a freshly opened create form.
pub const DEFAULT_STORY_POINTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryForm {
    /// Id of the story being edited; `None` when creating.
    pub editing: Option<String>,
    pub title: String,
    pub epic_name: String,
    pub story_points: u32,
    pub status: StoryStatus,
    pub assignee: String,
    pub details: String,
    /// Sprint the story is saved into.
    pub sprint_id: String,
    pub show_details: bool,
}

impl StoryForm {
    /// Blank form: first epic, first assignee, 3 points, todo, active sprint
    /// (or the first sprint when none is active).
    pub fn create(snapshot: &ProjectSnapshot) -> Self {
        let sprint_id = snapshot
            .active_sprint()
            .or_else(|| snapshot.sprints().first())
            .map(|s| s.id.clone())
            .unwrap_or_default();

        Self {
            editing: None,
            title: String::new(),
            epic_name: snapshot
                .epics()
                .first()
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            story_points: DEFAULT_STORY_POINTS,
            status: StoryStatus::Todo,
            assignee: first_assignee(snapshot),
            details: String::new(),
            sprint_id,
            show_details: false,
        }
    }

    /// Form pre-populated from an existing story, or `None` if it is unknown.
    pub fn edit(snapshot: &ProjectSnapshot, story_id: &str) -> Option<Self> {
        let (sprint, story) = snapshot.find_story(story_id)?;
        Some(Self {
            editing: Some(story.id.clone()),
            title: story.title.clone(),
            epic_name: story.epic_name.clone(),
            story_points: story.story_points,
            status: story.status,
            assignee: story
                .assignee
                .clone()
                .unwrap_or_else(|| first_assignee(snapshot)),
            details: story.details.clone().unwrap_or_default(),
            sprint_id: sprint.id.clone(),
            show_details: story.details.is_some(),
        })
    }

    /// Pick the target sprint. Pools pin the status to todo.
    pub fn set_sprint(&mut self, sprint_id: impl Into<String>) {
        self.sprint_id = sprint_id.into();
        if is_pool(&self.sprint_id) {
            self.status = StoryStatus::Todo;
        }
    }

    /// Whether the status selector is disabled.
    pub fn status_locked(&self) -> bool {
        is_pool(&self.sprint_id)
    }

    pub fn draft(&self) -> StoryDraft {
        StoryDraft {
            title: self.title.clone(),
            status: if self.status_locked() {
                StoryStatus::Todo
            } else {
                self.status
            },
            story_points: self.story_points,
            epic_name: self.epic_name.clone(),
            assignee: Some(self.assignee.clone()).filter(|a| !a.is_empty()),
            details: Some(self.details.clone()).filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn into_command(self) -> Command {
        let draft = self.draft();
        match self.editing {
            Some(story_id) => Command::EditStory {
                story_id,
                sprint_id: self.sprint_id,
                draft,
            },
            None => Command::CreateStory {
                sprint_id: self.sprint_id,
                draft,
            },
        }
    }
}

fn first_assignee(snapshot: &ProjectSnapshot) -> String {
    snapshot
        .assignees()
        .first()
        .map(|a| a.name.clone())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicForm {
    pub editing: Option<String>,
    pub name: String,
    pub icon_key: String,
    pub color_key: String,
}

impl EpicForm {
    pub fn create() -> Self {
        Self {
            editing: None,
            name: String::new(),
            icon_key: DEFAULT_EPIC_ICON.to_string(),
            color_key: DEFAULT_EPIC_COLOR.to_string(),
        }
    }

    pub fn edit(snapshot: &ProjectSnapshot, epic_id: &str) -> Option<Self> {
        let epic = snapshot.epic(epic_id)?;
        Some(Self {
            editing: Some(epic.id.clone()),
            name: epic.name.clone(),
            icon_key: epic.icon_key.clone(),
            color_key: epic.color_key.clone(),
        })
    }

    pub fn into_command(self) -> Command {
        let draft = EpicDraft {
            name: self.name,
            icon_key: self.icon_key,
            color_key: self.color_key,
        };
        match self.editing {
            Some(epic_id) => Command::EditEpic { epic_id, draft },
            None => Command::CreateEpic {
                epic_id: new_entity_id("epic"),
                draft,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintForm {
    pub editing: Option<String>,
    pub name: String,
    pub date_range: String,
}

impl SprintForm {
    pub fn create() -> Self {
        Self {
            editing: None,
            name: String::new(),
            date_range: String::new(),
        }
    }

    pub fn edit(snapshot: &ProjectSnapshot, sprint_id: &str) -> Option<Self> {
        let sprint = snapshot.sprint(sprint_id)?;
        Some(Self {
            editing: Some(sprint.id.clone()),
            name: sprint.name.clone(),
            date_range: sprint.date_range.clone(),
        })
    }

    pub fn into_command(self) -> Command {
        let draft = SprintDraft {
            name: self.name,
            date_range: self.date_range,
        };
        match self.editing {
            Some(sprint_id) => Command::EditSprint { sprint_id, draft },
            None => Command::CreateSprint {
                sprint_id: new_entity_id("sprint"),
                draft,
            },
        }
    }
}

/// The modal currently shown, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Story(StoryForm),
    Epic(EpicForm),
    Sprint(SprintForm),
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Close the modal and hand back the command its form describes.
    pub fn submit(&mut self) -> Option<Command> {
        match std::mem::take(self) {
            Self::Closed => None,
            Self::Story(form) => Some(form.into_command()),
            Self::Epic(form) => Some(form.into_command()),
            Self::Sprint(form) => Some(form.into_command()),
        }
    }
}
