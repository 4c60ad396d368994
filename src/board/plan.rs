//! Pure planning of board commands.
//!
//! [`plan`] turns the current snapshot and a [`Command`] into the snapshot
//! that should be shown next plus the ordered list of [`Write`]s that make
//! the remote store agree with it. It never touches the network, so every
//! local rule (guards, forced statuses, id generation) lives here.

use serde_json::{Map, Value};

use crate::models::*;
use crate::store::{ClientError, DocumentStore, SprintPatch};
use crate::views::{self, Column};

use super::Rejection;

/// Highest story points a story may carry.
pub const MAX_STORY_POINTS: u32 = 21;

/// Story fields as edited in the story form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub status: StoryStatus,
    pub story_points: u32,
    pub epic_name: String,
    pub assignee: Option<String>,
    pub details: Option<String>,
}

/// Epic fields as edited in the epic form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicDraft {
    pub name: String,
    pub icon_key: String,
    pub color_key: String,
}

/// Sprint fields as edited in the sprint form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintDraft {
    pub name: String,
    pub date_range: String,
}

/// A user intent against the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Advance a story one step through the status cycle.
    ToggleStatus { story_id: String },
    /// Drop a story onto a Kanban column of its sprint.
    DropOnColumn { story_id: String, column: Column },
    /// Move a story to the end of another sprint.
    MoveStory { story_id: String, to_sprint: String },
    /// Move a story to a new position inside its sprint.
    ReorderStory { story_id: String, to_index: usize },
    CreateStory { sprint_id: String, draft: StoryDraft },
    /// Overwrite a story's fields; a different `sprint_id` also moves it.
    EditStory {
        story_id: String,
        sprint_id: String,
        draft: StoryDraft,
    },
    DeleteStory { story_id: String },
    CreateEpic { epic_id: String, draft: EpicDraft },
    EditEpic { epic_id: String, draft: EpicDraft },
    DeleteEpic { epic_id: String },
    CreateSprint { sprint_id: String, draft: SprintDraft },
    EditSprint { sprint_id: String, draft: SprintDraft },
    DeleteSprint { sprint_id: String },
    /// Make one sprint active and every other sprint planned.
    ///
    /// Every other sprint is written, including ones already planned, and
    /// completed sprints are demoted to planned as well.
    ActivateSprint { sprint_id: String },
}

/// One remote call needed to persist a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    PatchSprint { sprint_id: String, patch: SprintPatch },
    PostSprint(Sprint),
    DeleteSprint(String),
    PutEpic(Epic),
    PostEpic(Epic),
    DeleteEpic(String),
    StoryCounter(u64),
}

impl Write {
    fn stories(sprint: &Sprint) -> Self {
        Self::PatchSprint {
            sprint_id: sprint.id.clone(),
            patch: SprintPatch::Stories {
                stories: sprint.stories.clone(),
            },
        }
    }

    /// Issue this write against `store`.
    pub async fn send<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<(), ClientError> {
        match self {
            Self::PatchSprint { sprint_id, patch } => store.patch_sprint(sprint_id, patch).await,
            Self::PostSprint(sprint) => store.post_sprint(sprint).await,
            Self::DeleteSprint(id) => store.delete_sprint(id).await,
            Self::PutEpic(epic) => store.put_epic(epic).await,
            Self::PostEpic(epic) => store.post_epic(epic).await,
            Self::DeleteEpic(id) => store.delete_epic(id).await,
            Self::StoryCounter(value) => store.patch_settings_counter(*value).await,
        }
    }
}

impl std::fmt::Display for Write {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatchSprint { sprint_id, .. } => write!(f, "PATCH /sprints/{}", sprint_id),
            Self::PostSprint(_) => f.write_str("POST /sprints"),
            Self::DeleteSprint(id) => write!(f, "DELETE /sprints/{}", id),
            Self::PutEpic(epic) => write!(f, "PUT /epics/{}", epic.id),
            Self::PostEpic(_) => f.write_str("POST /epics"),
            Self::DeleteEpic(id) => write!(f, "DELETE /epics/{}", id),
            Self::StoryCounter(_) => f.write_str("PATCH /settings"),
        }
    }
}

/// What a successfully planned command produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Snapshot to show immediately.
    pub next: ProjectSnapshot,
    /// Remote calls, in the order they must be issued.
    pub writes: Vec<Write>,
    /// Id of the story, epic or sprint the command created, if any.
    pub created: Option<String>,
}

/// Plan `command` against `snapshot`.
///
/// Returns `Ok(None)` when the command would not change anything (dropping a
/// story on its current column, moving it to its own sprint, reordering it to
/// its current index). Local rule violations are returned as [`Rejection`]s
/// before any write is planned.
pub fn plan(
    snapshot: &ProjectSnapshot,
    command: &Command,
    story_prefix: &str,
) -> Result<Option<Plan>, Rejection> {
    let mut next = snapshot.clone();
    let mut writes = Vec::new();
    let mut created = None;

    match command {
        Command::ToggleStatus { story_id } => {
            let (sprint, story) = find_story(snapshot, story_id)?;
            ensure_status_unlocked(sprint)?;
            let status = story.status.next();
            let sprint = with_story(sprint, story_id, |s| s.status = status);
            writes.push(Write::stories(&sprint));
            next.replace_sprint(sprint);
        }
        Command::DropOnColumn { story_id, column } => {
            let (sprint, story) = find_story(snapshot, story_id)?;
            ensure_status_unlocked(sprint)?;
            let status = column.status();
            if story.status == status {
                return Ok(None);
            }
            let sprint = with_story(sprint, story_id, |s| s.status = status);
            writes.push(Write::stories(&sprint));
            next.replace_sprint(sprint);
        }
        Command::MoveStory {
            story_id,
            to_sprint,
        } => {
            let (source, story) = find_story(snapshot, story_id)?;
            let target = find_sprint(snapshot, to_sprint)?;
            if source.id == target.id {
                return Ok(None);
            }
            let story = story.clone();
            move_between(&mut next, &mut writes, source, target, story);
        }
        Command::ReorderStory { story_id, to_index } => {
            let (sprint, _) = find_story(snapshot, story_id)?;
            let from = sprint
                .position_of(story_id)
                .ok_or_else(|| Rejection::UnknownStory(story_id.clone()))?;
            let to = (*to_index).min(sprint.stories.len() - 1);
            if from == to {
                return Ok(None);
            }
            let mut sprint = sprint.clone();
            let story = sprint.stories.remove(from);
            sprint.stories.insert(to, story);
            writes.push(Write::stories(&sprint));
            next.replace_sprint(sprint);
        }
        Command::CreateStory { sprint_id, draft } => {
            validate_story(draft)?;
            let target = find_sprint(snapshot, sprint_id)?;
            let number = next_story_number(snapshot, story_prefix);
            let id = format!("{}{}", story_prefix, number);
            let mut story = draft_to_story(id.clone(), draft, Map::new());
            if target.forces_todo() {
                story.status = StoryStatus::Todo;
            }
            let mut target = target.clone();
            target.stories.push(story);
            writes.push(Write::stories(&target));
            writes.push(Write::StoryCounter(number));
            next.replace_sprint(target);
            created = Some(id);
        }
        Command::EditStory {
            story_id,
            sprint_id,
            draft,
        } => {
            validate_story(draft)?;
            let (source, existing) = find_story(snapshot, story_id)?;
            let target = find_sprint(snapshot, sprint_id)?;
            let mut story = draft_to_story(story_id.clone(), draft, existing.extra.clone());
            if target.forces_todo() {
                story.status = StoryStatus::Todo;
            }
            if source.id == target.id {
                let sprint = with_story(source, story_id, |s| *s = story);
                writes.push(Write::stories(&sprint));
                next.replace_sprint(sprint);
            } else {
                move_between(&mut next, &mut writes, source, target, story);
            }
        }
        Command::DeleteStory { story_id } => {
            let (sprint, _) = find_story(snapshot, story_id)?;
            let mut sprint = sprint.clone();
            sprint.stories.retain(|s| s.id != *story_id);
            writes.push(Write::stories(&sprint));
            next.replace_sprint(sprint);
        }
        Command::CreateEpic { epic_id, draft } => {
            validate_epic(draft)?;
            let epic = Epic {
                id: epic_id.clone(),
                name: draft.name.clone(),
                icon_key: draft.icon_key.clone(),
                color_key: draft.color_key.clone(),
                total: epic_points(snapshot, &draft.name),
                extra: Map::new(),
            };
            writes.push(Write::PostEpic(epic.clone()));
            next.push_epic(epic);
            created = Some(epic_id.clone());
        }
        Command::EditEpic { epic_id, draft } => {
            validate_epic(draft)?;
            let current = snapshot
                .epic(epic_id)
                .ok_or_else(|| Rejection::UnknownEpic(epic_id.clone()))?;
            let epic = Epic {
                id: current.id.clone(),
                name: draft.name.clone(),
                icon_key: draft.icon_key.clone(),
                color_key: draft.color_key.clone(),
                total: epic_points(snapshot, &draft.name),
                extra: current.extra.clone(),
            };
            writes.push(Write::PutEpic(epic.clone()));
            next.replace_epic(epic);
        }
        Command::DeleteEpic { epic_id } => {
            let epic = snapshot
                .epic(epic_id)
                .ok_or_else(|| Rejection::UnknownEpic(epic_id.clone()))?;
            let in_use = snapshot
                .stories()
                .any(|s| s.epic_name == epic.id || s.epic_name == epic.name);
            if in_use {
                return Err(Rejection::EpicInUse(epic.name.clone()));
            }
            writes.push(Write::DeleteEpic(epic.id.clone()));
            next.remove_epic(epic_id);
        }
        Command::CreateSprint { sprint_id, draft } => {
            validate_sprint(draft)?;
            let sprint = Sprint {
                id: sprint_id.clone(),
                name: draft.name.trim().to_string(),
                date_range: draft.date_range.trim().to_string(),
                status: None,
                stories: Vec::new(),
            };
            writes.push(Write::PostSprint(sprint.clone()));
            next.push_sprint(sprint);
            created = Some(sprint_id.clone());
        }
        Command::EditSprint { sprint_id, draft } => {
            validate_sprint(draft)?;
            let sprint = find_sprint(snapshot, sprint_id)?;
            if sprint.is_backlog() {
                return Err(Rejection::ReservedSprint(sprint.id.clone()));
            }
            let mut sprint = sprint.clone();
            sprint.name = draft.name.trim().to_string();
            sprint.date_range = draft.date_range.trim().to_string();
            writes.push(Write::PatchSprint {
                sprint_id: sprint.id.clone(),
                patch: SprintPatch::Details {
                    name: sprint.name.clone(),
                    date_range: sprint.date_range.clone(),
                },
            });
            next.replace_sprint(sprint);
        }
        Command::DeleteSprint { sprint_id } => {
            let sprint = find_sprint(snapshot, sprint_id)?;
            if sprint.is_backlog() {
                return Err(Rejection::ReservedSprint(sprint.id.clone()));
            }
            if !sprint.stories.is_empty() {
                return Err(Rejection::SprintHasStories {
                    sprint: sprint.name.clone(),
                    count: sprint.stories.len(),
                });
            }
            writes.push(Write::DeleteSprint(sprint.id.clone()));
            next.remove_sprint(sprint_id);
        }
        Command::ActivateSprint { sprint_id } => {
            let sprint = find_sprint(snapshot, sprint_id)?;
            if sprint.forces_todo() {
                return Err(Rejection::ReservedSprint(sprint.id.clone()));
            }
            if sprint.is_active() {
                return Err(Rejection::AlreadyActive(sprint.name.clone()));
            }
            writes.push(status_write(sprint_id, SprintStatus::Active));
            for other in next.sprints_mut() {
                if other.id == *sprint_id {
                    other.status = Some(SprintStatus::Active);
                } else {
                    other.status = Some(SprintStatus::Planned);
                    writes.push(status_write(&other.id, SprintStatus::Planned));
                }
            }
        }
    }

    Ok(Some(Plan {
        next,
        writes,
        created,
    }))
}

/// Highest numeric suffix among ids carrying `prefix`, plus one.
///
/// Two clients computing this concurrently can hand out the same id.
pub fn next_story_number(snapshot: &ProjectSnapshot, prefix: &str) -> u64 {
    snapshot
        .stories()
        .filter_map(|s| story_number(&s.id, prefix))
        .max()
        .unwrap_or(0)
        + 1
}

fn status_write(sprint_id: &str, status: SprintStatus) -> Write {
    Write::PatchSprint {
        sprint_id: sprint_id.to_string(),
        patch: SprintPatch::Status { status },
    }
}

/// Remove `story` from `source`, append it to `target`, source persisted first.
fn move_between(
    next: &mut ProjectSnapshot,
    writes: &mut Vec<Write>,
    source: &Sprint,
    target: &Sprint,
    mut story: Story,
) {
    if target.forces_todo() {
        story.status = StoryStatus::Todo;
    }
    let mut source = source.clone();
    source.stories.retain(|s| s.id != story.id);
    let mut target = target.clone();
    target.stories.push(story);

    writes.push(Write::stories(&source));
    writes.push(Write::stories(&target));
    next.replace_sprint(source);
    next.replace_sprint(target);
}

fn find_story<'a>(
    snapshot: &'a ProjectSnapshot,
    story_id: &str,
) -> Result<(&'a Sprint, &'a Story), Rejection> {
    snapshot
        .find_story(story_id)
        .ok_or_else(|| Rejection::UnknownStory(story_id.to_string()))
}

fn find_sprint<'a>(snapshot: &'a ProjectSnapshot, sprint_id: &str) -> Result<&'a Sprint, Rejection> {
    snapshot
        .sprint(sprint_id)
        .ok_or_else(|| Rejection::UnknownSprint(sprint_id.to_string()))
}

fn ensure_status_unlocked(sprint: &Sprint) -> Result<(), Rejection> {
    if sprint.forces_todo() {
        return Err(Rejection::StatusLocked(sprint.id.clone()));
    }
    Ok(())
}

fn with_story(sprint: &Sprint, story_id: &str, edit: impl FnOnce(&mut Story)) -> Sprint {
    let mut sprint = sprint.clone();
    if let Some(story) = sprint.stories.iter_mut().find(|s| s.id == story_id) {
        edit(story);
    }
    sprint
}

/// Build a story from form fields, carrying over fields the form does not edit.
fn draft_to_story(id: String, draft: &StoryDraft, extra: Map<String, Value>) -> Story {
    Story {
        id,
        title: draft.title.trim().to_string(),
        status: draft.status,
        story_points: draft.story_points,
        epic_name: draft.epic_name.clone(),
        assignee: draft.assignee.clone().filter(|a| !a.is_empty()),
        details: draft.details.clone().filter(|d| !d.trim().is_empty()),
        extra,
    }
}

/// Derived total sent along with epic writes; the store's copy is informational only.
fn epic_points(snapshot: &ProjectSnapshot, name: &str) -> u32 {
    views::points_for_epic(snapshot, name)
}

fn validate_story(draft: &StoryDraft) -> Result<(), Rejection> {
    if draft.title.trim().is_empty() {
        return Err(Rejection::InvalidForm("story title is required".to_string()));
    }
    if !(1..=MAX_STORY_POINTS).contains(&draft.story_points) {
        return Err(Rejection::InvalidForm(format!(
            "story points must be between 1 and {}",
            MAX_STORY_POINTS
        )));
    }
    Ok(())
}

fn validate_epic(draft: &EpicDraft) -> Result<(), Rejection> {
    if draft.name.trim().is_empty() {
        return Err(Rejection::InvalidForm("epic name is required".to_string()));
    }
    Ok(())
}

fn validate_sprint(draft: &SprintDraft) -> Result<(), Rejection> {
    if draft.name.trim().is_empty() {
        return Err(Rejection::InvalidForm("sprint name is required".to_string()));
    }
    if draft.date_range.trim().is_empty() {
        return Err(Rejection::InvalidForm("sprint date range is required".to_string()));
    }
    Ok(())
}
