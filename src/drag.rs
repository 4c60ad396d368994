//! Drag-and-drop session state for the board view.
//!
//! The gesture itself belongs to whatever front end drives the board. This
//! module only remembers which card is lifted and turns a drop into a
//! [`Command`] (or nothing).

use crate::board::{Command, Rejection};
use crate::models::*;
use crate::views::Column;

/// What the card was released over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget<'a> {
    /// A column, by column id (`todo`, `in-progress`, `done`).
    Column(&'a str),
    /// Another card, by story id.
    Card(&'a str),
    /// Outside any drop zone.
    Nowhere,
}

/// Drag state for the board of one sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    sprint_id: String,
    lifted: Option<String>,
}

impl DragSession {
    pub fn new(sprint_id: impl Into<String>) -> Self {
        Self {
            sprint_id: sprint_id.into(),
            lifted: None,
        }
    }

    pub fn sprint_id(&self) -> &str {
        &self.sprint_id
    }

    pub fn lift(&mut self, story_id: impl Into<String>) {
        self.lifted = Some(story_id.into());
    }

    pub fn lifted(&self) -> Option<&str> {
        self.lifted.as_deref()
    }

    pub fn cancel(&mut self) {
        self.lifted = None;
    }

    /// Release the lifted card over `target`. The session is cleared either way.
    ///
    /// Returns `Ok(None)` when there is nothing to do: no card lifted, an
    /// invalid target, or a drop that changes neither status nor position.
    /// A drop that would change anything on a todo-only pool is rejected.
    pub fn drop(
        &mut self,
        snapshot: &ProjectSnapshot,
        target: DropTarget<'_>,
    ) -> Result<Option<Command>, Rejection> {
        let Some(story_id) = self.lifted.take() else {
            return Ok(None);
        };

        let sprint = snapshot
            .sprint(&self.sprint_id)
            .ok_or_else(|| Rejection::UnknownSprint(self.sprint_id.clone()))?;
        let Some(story) = sprint.story(&story_id) else {
            tracing::debug!(story = %story_id, sprint = %sprint.id, "Dropped card is not on this board");
            return Ok(None);
        };

        let Some(command) = resolve(sprint, story, target) else {
            return Ok(None);
        };
        if sprint.forces_todo() {
            return Err(Rejection::StatusLocked(sprint.id.clone()));
        }
        Ok(Some(command))
    }
}

/// The command a release of `story` over `target` stands for, if any.
fn resolve(sprint: &Sprint, story: &Story, target: DropTarget<'_>) -> Option<Command> {
    let column = match target {
        DropTarget::Nowhere => return None,
        DropTarget::Column(id) => Column::from_id(id)?,
        DropTarget::Card(over_id) => {
            let over = sprint.story(over_id)?;
            let column = Column::for_status(over.status);
            if column == Column::for_status(story.status) {
                if over_id == story.id {
                    return None;
                }
                return sprint
                    .position_of(over_id)
                    .map(|to_index| Command::ReorderStory {
                        story_id: story.id.clone(),
                        to_index,
                    });
            }
            column
        }
    };

    if story.status == column.status() {
        return None;
    }
    Some(Command::DropOnColumn {
        story_id: story.id.clone(),
        column,
    })
}
