//! The mutation coordinator.
//!
//! [`Board`] owns the current [`ProjectSnapshot`] and is the only writer of
//! it. Every change goes through [`Board::execute`]:
//!
//! 1. the command is planned against the snapshot ([`plan::plan`]);
//! 2. the planned snapshot replaces the current one immediately;
//! 3. the planned writes are sent to the store in order;
//! 4. if any write fails, the remaining writes are dropped and the snapshot is
//!    replaced by a fresh [`DocumentStore::load`].
//!
//! Revert is always "replace the whole snapshot", never a field-level undo.
//! Multi-write commands are not transactional: a failure between writes
//! leaves the store partially updated, and the reload shows exactly that.

pub mod plan;

use chrono::Utc;
use thiserror::Error;

use crate::models::*;
use crate::store::{ClientError, DocumentStore};
use crate::views::{self, Column, ProjectStats};

pub use plan::{Command, EpicDraft, Plan, SprintDraft, StoryDraft, Write, MAX_STORY_POINTS};

/// Default prefix of generated story ids.
pub const DEFAULT_STORY_PREFIX: &str = "SPK-";

/// A command refused locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Cannot delete epic \"{0}\" because it is assigned to stories")]
    EpicInUse(String),

    #[error("Cannot delete sprint \"{sprint}\": it still holds {count} stories")]
    SprintHasStories { sprint: String, count: usize },

    #[error("Sprint \"{0}\" is reserved and cannot be changed this way")]
    ReservedSprint(String),

    #[error("Sprint \"{0}\" is already active")]
    AlreadyActive(String),

    #[error("Stories in \"{0}\" always stay in todo")]
    StatusLocked(String),

    #[error("Story not found: {0}")]
    UnknownStory(String),

    #[error("Sprint not found: {0}")]
    UnknownSprint(String),

    #[error("Epic not found: {0}")]
    UnknownEpic(String),

    #[error("Invalid form: {0}")]
    InvalidForm(String),
}

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A write failed. The board reloaded from the store when `resynced` is true,
    /// otherwise it still shows the optimistic state and is marked stale.
    #[error("Saving failed ({source}); {}", persist_note(.resynced))]
    Persist {
        #[source]
        source: ClientError,
        resynced: bool,
    },

    #[error("Error loading data: {0}")]
    Load(#[source] ClientError),
}

/// Result of a command that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to change; no write was issued.
    Unchanged,
    Applied,
    /// Applied, and created the entity with this id.
    Created(String),
}

/// Optimistic state container over a [`DocumentStore`].
pub struct Board<S> {
    store: S,
    snapshot: ProjectSnapshot,
    story_prefix: String,
    stale: bool,
}

impl<S: DocumentStore> Board<S> {
    /// Load the board. Any failed read fails the load; no partial snapshot is kept.
    pub async fn load(store: S) -> Result<Self, BoardError> {
        let snapshot = store.load().await.map_err(BoardError::Load)?;
        Ok(Self::with_snapshot(store, snapshot))
    }

    /// Wrap an already known snapshot.
    pub fn with_snapshot(store: S, snapshot: ProjectSnapshot) -> Self {
        Self {
            store,
            snapshot,
            story_prefix: DEFAULT_STORY_PREFIX.to_string(),
            stale: false,
        }
    }

    pub fn with_story_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.story_prefix = prefix.into();
        self
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the last resync failed and the snapshot may differ from the store.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Replace the snapshot with the authoritative remote state.
    pub async fn reload(&mut self) -> Result<(), BoardError> {
        let snapshot = self.store.load().await.map_err(BoardError::Load)?;
        self.snapshot = snapshot;
        self.stale = false;
        Ok(())
    }

    /// Plan, apply optimistically, persist, and revert by reload on failure.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome, BoardError> {
        let plan = match plan::plan(&self.snapshot, &command, &self.story_prefix) {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::debug!(?command, "Command changes nothing");
                return Ok(Outcome::Unchanged);
            }
            Err(rejection) => {
                tracing::warn!(%rejection, "Command rejected");
                return Err(rejection.into());
            }
        };

        self.snapshot = plan.next;

        for write in &plan.writes {
            if let Err(source) = write.send(&self.store).await {
                tracing::warn!(%write, error = %source, "Write failed, reloading board");
                let resynced = self.resync().await;
                return Err(BoardError::Persist { source, resynced });
            }
        }

        tracing::info!(writes = plan.writes.len(), "Board change saved");
        Ok(match plan.created {
            Some(id) => Outcome::Created(id),
            None => Outcome::Applied,
        })
    }

    async fn resync(&mut self) -> bool {
        match self.store.load().await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.stale = false;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Reload after failed write also failed");
                self.stale = true;
                false
            }
        }
    }

    // ============================================================
    // Story Operations
    // ============================================================

    pub async fn toggle_status(&mut self, story_id: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::ToggleStatus {
            story_id: story_id.to_string(),
        })
        .await
    }

    pub async fn drop_on_column(
        &mut self,
        story_id: &str,
        column: Column,
    ) -> Result<Outcome, BoardError> {
        self.execute(Command::DropOnColumn {
            story_id: story_id.to_string(),
            column,
        })
        .await
    }

    pub async fn move_story(&mut self, story_id: &str, to_sprint: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::MoveStory {
            story_id: story_id.to_string(),
            to_sprint: to_sprint.to_string(),
        })
        .await
    }

    pub async fn reorder_story(
        &mut self,
        story_id: &str,
        to_index: usize,
    ) -> Result<Outcome, BoardError> {
        self.execute(Command::ReorderStory {
            story_id: story_id.to_string(),
            to_index,
        })
        .await
    }

    pub async fn create_story(
        &mut self,
        sprint_id: &str,
        draft: StoryDraft,
    ) -> Result<Outcome, BoardError> {
        self.execute(Command::CreateStory {
            sprint_id: sprint_id.to_string(),
            draft,
        })
        .await
    }

    pub async fn edit_story(
        &mut self,
        story_id: &str,
        sprint_id: &str,
        draft: StoryDraft,
    ) -> Result<Outcome, BoardError> {
        self.execute(Command::EditStory {
            story_id: story_id.to_string(),
            sprint_id: sprint_id.to_string(),
            draft,
        })
        .await
    }

    pub async fn delete_story(&mut self, story_id: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::DeleteStory {
            story_id: story_id.to_string(),
        })
        .await
    }

    // ============================================================
    // Epic Operations
    // ============================================================

    pub async fn create_epic(&mut self, draft: EpicDraft) -> Result<Outcome, BoardError> {
        self.execute(Command::CreateEpic {
            epic_id: new_entity_id("epic"),
            draft,
        })
        .await
    }

    pub async fn edit_epic(&mut self, epic_id: &str, draft: EpicDraft) -> Result<Outcome, BoardError> {
        self.execute(Command::EditEpic {
            epic_id: epic_id.to_string(),
            draft,
        })
        .await
    }

    pub async fn delete_epic(&mut self, epic_id: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::DeleteEpic {
            epic_id: epic_id.to_string(),
        })
        .await
    }

    // ============================================================
    // Sprint Operations
    // ============================================================

    pub async fn create_sprint(&mut self, draft: SprintDraft) -> Result<Outcome, BoardError> {
        self.execute(Command::CreateSprint {
            sprint_id: new_entity_id("sprint"),
            draft,
        })
        .await
    }

    pub async fn edit_sprint(
        &mut self,
        sprint_id: &str,
        draft: SprintDraft,
    ) -> Result<Outcome, BoardError> {
        self.execute(Command::EditSprint {
            sprint_id: sprint_id.to_string(),
            draft,
        })
        .await
    }

    pub async fn delete_sprint(&mut self, sprint_id: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::DeleteSprint {
            sprint_id: sprint_id.to_string(),
        })
        .await
    }

    pub async fn activate_sprint(&mut self, sprint_id: &str) -> Result<Outcome, BoardError> {
        self.execute(Command::ActivateSprint {
            sprint_id: sprint_id.to_string(),
        })
        .await
    }

    // ============================================================
    // Derived Views
    // ============================================================

    pub fn stats(&self) -> ProjectStats {
        views::project_stats(&self.snapshot)
    }

    pub fn sprint_stats(&self, sprint_id: &str) -> Option<ProjectStats> {
        views::sprint_stats(&self.snapshot, sprint_id)
    }

    pub fn epics_with_totals(&self) -> Vec<Epic> {
        views::epic_totals(&self.snapshot)
    }
}

fn persist_note(resynced: &bool) -> &'static str {
    if *resynced {
        "changes were reverted"
    } else {
        "board could not be reloaded"
    }
}

/// `<prefix>-<unix millis>`, the id scheme for new epics and sprints.
pub fn new_entity_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}
