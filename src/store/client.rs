//! HTTP client for the document store.
//!
//! The base URL comes from [`Config`](crate::config::Config).

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::{DocumentStore, SprintPatch};
use crate::models::*;

/// Default URL for a local json-server.
pub const DEFAULT_URL: &str = "http://localhost:3001";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// [`DocumentStore`] over plain HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    client: Client,
}

impl HttpStore {
    /// Create with explicit base URL. A trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Document store request");
        self.client.request(method, &url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).send().await?;
        handle_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let response = self.request(method, path).json(body).send().await?;
        handle_empty_response(response).await
    }
}

/// Handle response, converting HTTP errors to ClientError.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(status_error(status, response).await)
    }
}

/// Handle response whose body is ignored (json-server echoes the entity back).
async fn handle_empty_response(response: reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(status_error(status, response).await)
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
        _ => ClientError::Server(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn load(&self) -> Result<ProjectSnapshot, ClientError> {
        let (sprints, epics, assignees) = tokio::try_join!(
            self.get::<Vec<Sprint>>("/sprints"),
            self.get::<Vec<Epic>>("/epics"),
            self.get::<Vec<Assignee>>("/assignees"),
        )?;
        tracing::debug!(
            sprints = sprints.len(),
            epics = epics.len(),
            assignees = assignees.len(),
            "Loaded project snapshot"
        );
        Ok(ProjectSnapshot::new(sprints, epics, assignees))
    }

    async fn patch_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> Result<(), ClientError> {
        self.send_json(Method::PATCH, &format!("/sprints/{}", sprint_id), patch)
            .await
    }

    async fn post_sprint(&self, sprint: &Sprint) -> Result<(), ClientError> {
        self.send_json(Method::POST, "/sprints", sprint).await
    }

    async fn delete_sprint(&self, sprint_id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/sprints/{}", sprint_id))
            .send()
            .await?;
        handle_empty_response(response).await
    }

    async fn put_epic(&self, epic: &Epic) -> Result<(), ClientError> {
        self.send_json(Method::PUT, &format!("/epics/{}", epic.id), epic)
            .await
    }

    async fn post_epic(&self, epic: &Epic) -> Result<(), ClientError> {
        self.send_json(Method::POST, "/epics", epic).await
    }

    async fn delete_epic(&self, epic_id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/epics/{}", epic_id))
            .send()
            .await?;
        handle_empty_response(response).await
    }

    async fn patch_settings_counter(&self, value: u64) -> Result<(), ClientError> {
        self.send_json(
            Method::PATCH,
            "/settings",
            &StoryCounter {
                last_story_id: value,
            },
        )
        .await
    }

    async fn login(&self) -> Result<LoginCredentials, ClientError> {
        self.get("/login").await
    }
}
