//! Access to the remote document store.
//!
//! The store is a generic JSON collection server (json-server style): every
//! collection supports list, partial update, replace, create and delete by id.
//! [`DocumentStore`] captures the calls the board makes against it; each
//! method is exactly one network round trip except [`DocumentStore::load`],
//! which performs the three collection reads.
//!
//! Callers own ordering. When one logical change needs several calls (a
//! cross-sprint move, a sprint activation), the caller issues them in
//! sequence and there is no transaction around them.

mod client;

pub use client::{ClientError, HttpStore, DEFAULT_URL};

use async_trait::async_trait;
use serde::Serialize;

use crate::models::*;

/// Partial sprint update, serialized as the `PATCH /sprints/{id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SprintPatch {
    /// `{stories: [...]}`
    Stories { stories: Vec<Story> },
    /// `{name, weeks}`
    Details {
        name: String,
        #[serde(rename = "weeks")]
        date_range: String,
    },
    /// `{status}`
    Status { status: SprintStatus },
}

/// The calls the board issues against the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch sprints, epics and assignees. Any failed read fails the whole load.
    async fn load(&self) -> Result<ProjectSnapshot, ClientError>;

    async fn patch_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> Result<(), ClientError>;

    async fn post_sprint(&self, sprint: &Sprint) -> Result<(), ClientError>;

    async fn delete_sprint(&self, sprint_id: &str) -> Result<(), ClientError>;

    /// Replace an epic wholesale.
    async fn put_epic(&self, epic: &Epic) -> Result<(), ClientError>;

    async fn post_epic(&self, epic: &Epic) -> Result<(), ClientError>;

    async fn delete_epic(&self, epic_id: &str) -> Result<(), ClientError>;

    /// Record the story id high-water mark.
    async fn patch_settings_counter(&self, value: u64) -> Result<(), ClientError>;

    /// Fetch the shared login credentials.
    async fn login(&self) -> Result<LoginCredentials, ClientError>;

    /// Replace the story list of a sprint.
    async fn patch_sprint_stories(
        &self,
        sprint_id: &str,
        stories: &[Story],
    ) -> Result<(), ClientError> {
        self.patch_sprint(
            sprint_id,
            &SprintPatch::Stories {
                stories: stories.to_vec(),
            },
        )
        .await
    }
}
