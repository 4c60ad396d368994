use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Assignee, Epic, Sprint, Story};

/// The whole board as the client sees it.
///
/// This is the single in-memory source of truth. It is replaced wholesale on
/// load and on revert, and swapped for a freshly computed snapshot when a
/// mutation is applied optimistically.
///
/// A story-id → sprint-id index is maintained alongside the sprints so that
/// owner lookups never scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotParts", into = "SnapshotParts")]
pub struct ProjectSnapshot {
    sprints: Vec<Sprint>,
    epics: Vec<Epic>,
    assignees: Vec<Assignee>,
    owners: HashMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotParts {
    sprints: Vec<Sprint>,
    epics: Vec<Epic>,
    assignees: Vec<Assignee>,
}

impl From<SnapshotParts> for ProjectSnapshot {
    fn from(parts: SnapshotParts) -> Self {
        Self::new(parts.sprints, parts.epics, parts.assignees)
    }
}

impl From<ProjectSnapshot> for SnapshotParts {
    fn from(snapshot: ProjectSnapshot) -> Self {
        Self {
            sprints: snapshot.sprints,
            epics: snapshot.epics,
            assignees: snapshot.assignees,
        }
    }
}

impl ProjectSnapshot {
    pub fn new(sprints: Vec<Sprint>, epics: Vec<Epic>, assignees: Vec<Assignee>) -> Self {
        let mut snapshot = Self {
            sprints,
            epics,
            assignees,
            owners: HashMap::new(),
        };
        snapshot.reindex();
        snapshot
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn epics(&self) -> &[Epic] {
        &self.epics
    }

    pub fn assignees(&self) -> &[Assignee] {
        &self.assignees
    }

    pub fn sprint(&self, sprint_id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == sprint_id)
    }

    pub fn epic(&self, epic_id: &str) -> Option<&Epic> {
        self.epics.iter().find(|e| e.id == epic_id)
    }

    /// Id of the sprint currently holding `story_id`.
    pub fn owner_of(&self, story_id: &str) -> Option<&str> {
        self.owners.get(story_id).map(String::as_str)
    }

    /// The story with `story_id` and the sprint that owns it.
    pub fn find_story(&self, story_id: &str) -> Option<(&Sprint, &Story)> {
        let sprint = self.sprint(self.owner_of(story_id)?)?;
        let story = sprint.story(story_id)?;
        Some((sprint, story))
    }

    pub fn active_sprint(&self) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.is_active())
    }

    /// Every story in sprint order.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.sprints.iter().flat_map(|s| s.stories.iter())
    }

    /// Replace the sprint with the same id, keeping its position.
    pub(crate) fn replace_sprint(&mut self, sprint: Sprint) {
        if let Some(slot) = self.sprints.iter_mut().find(|s| s.id == sprint.id) {
            *slot = sprint;
            self.reindex();
        }
    }

    pub(crate) fn push_sprint(&mut self, sprint: Sprint) {
        self.sprints.push(sprint);
        self.reindex();
    }

    pub(crate) fn remove_sprint(&mut self, sprint_id: &str) {
        self.sprints.retain(|s| s.id != sprint_id);
        self.reindex();
    }

    pub(crate) fn sprints_mut(&mut self) -> impl Iterator<Item = &mut Sprint> {
        self.sprints.iter_mut()
    }

    pub(crate) fn replace_epic(&mut self, epic: Epic) {
        if let Some(slot) = self.epics.iter_mut().find(|e| e.id == epic.id) {
            *slot = epic;
        }
    }

    pub(crate) fn push_epic(&mut self, epic: Epic) {
        self.epics.push(epic);
    }

    pub(crate) fn remove_epic(&mut self, epic_id: &str) {
        self.epics.retain(|e| e.id != epic_id);
    }

    fn reindex(&mut self) {
        self.owners.clear();
        for sprint in &self.sprints {
            for story in &sprint.stories {
                if let Some(first) = self.owners.get(&story.id) {
                    tracing::warn!(
                        story = %story.id,
                        kept = %first,
                        ignored = %sprint.id,
                        "Duplicate story id in snapshot"
                    );
                    continue;
                }
                self.owners.insert(story.id.clone(), sprint.id.clone());
            }
        }
    }
}
