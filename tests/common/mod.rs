//! Shared test fixtures: a recording in-memory store and an HTTP fake of the
//! document store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};

use scrum_board::models::*;
use scrum_board::store::{ClientError, DocumentStore, SprintPatch};

// ============================================================
// Fixtures
// ============================================================

pub fn story(id: &str, status: StoryStatus, points: u32, epic: &str) -> Story {
    Story {
        id: id.to_string(),
        title: format!("Story {}", id),
        status,
        story_points: points,
        epic_name: epic.to_string(),
        assignee: Some("Ana".to_string()),
        details: None,
        extra: Default::default(),
    }
}

pub fn sprint(id: &str, status: Option<SprintStatus>, stories: Vec<Story>) -> Sprint {
    Sprint {
        id: id.to_string(),
        name: format!("Sprint {}", id),
        date_range: "Jan 01 - Jan 14".to_string(),
        status,
        stories,
    }
}

pub fn epic(id: &str, name: &str) -> Epic {
    Epic {
        id: id.to_string(),
        name: name.to_string(),
        icon_key: DEFAULT_EPIC_ICON.to_string(),
        color_key: DEFAULT_EPIC_COLOR.to_string(),
        total: 0,
        extra: Default::default(),
    }
}

/// Backlog, an active sprint-1 holding SPK-1..SPK-5, an empty planned sprint-2,
/// and three epics of which "Docs" is unused.
pub fn sample_snapshot() -> ProjectSnapshot {
    ProjectSnapshot::new(
        vec![
            sprint(BACKLOG_ID, None, vec![]),
            sprint(
                "sprint-1",
                Some(SprintStatus::Active),
                vec![
                    story("SPK-1", StoryStatus::Todo, 3, "Website"),
                    story("SPK-2", StoryStatus::InProgress, 5, "Website"),
                    story("SPK-3", StoryStatus::Done, 2, "Mobile"),
                    story("SPK-4", StoryStatus::Blocked, 8, "Mobile"),
                    story("SPK-5", StoryStatus::Done, 1, "Website"),
                ],
            ),
            sprint("sprint-2", Some(SprintStatus::Planned), vec![]),
        ],
        vec![
            epic("epic-1", "Website"),
            epic("epic-2", "Mobile"),
            epic("epic-3", "Docs"),
        ],
        vec![Assignee {
            id: "1".to_string(),
            name: "Ana".to_string(),
        }],
    )
}

// ============================================================
// Recording Store
// ============================================================

/// A remote call as seen by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load,
    PatchSprint(String, SprintPatch),
    PostSprint(String),
    DeleteSprint(String),
    PutEpic(Epic),
    PostEpic(String),
    DeleteEpic(String),
    Counter(u64),
    Login,
}

#[derive(Default)]
struct Remote {
    sprints: Vec<Sprint>,
    epics: Vec<Epic>,
    assignees: Vec<Assignee>,
}

/// In-memory [`DocumentStore`] that applies writes to its own copy of the
/// data and records every call. Writes can be made to fail after a number of
/// successes, and loads can be made to fail.
#[derive(Default)]
pub struct RecordingStore {
    remote: Mutex<Remote>,
    calls: Mutex<Vec<Call>>,
    writes_before_failure: Mutex<Option<usize>>,
    fail_loads: Mutex<bool>,
}

impl RecordingStore {
    pub fn new(snapshot: &ProjectSnapshot) -> Self {
        Self {
            remote: Mutex::new(Remote {
                sprints: snapshot.sprints().to_vec(),
                epics: snapshot.epics().to_vec(),
                assignees: snapshot.assignees().to_vec(),
            }),
            ..Default::default()
        }
    }

    /// Let `successes` more writes through, then fail every write.
    pub fn fail_writes_after(&self, successes: usize) {
        *self.writes_before_failure.lock().unwrap() = Some(successes);
    }

    pub fn fail_loads(&self, fail: bool) {
        *self.fail_loads.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than loads.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Load | Call::Login))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn remote_snapshot(&self) -> ProjectSnapshot {
        let remote = self.remote.lock().unwrap();
        ProjectSnapshot::new(
            remote.sprints.clone(),
            remote.epics.clone(),
            remote.assignees.clone(),
        )
    }

    fn write(&self, call: Call, apply: impl FnOnce(&mut Remote)) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        let mut budget = self.writes_before_failure.lock().unwrap();
        if let Some(left) = budget.as_mut() {
            if *left == 0 {
                return Err(ClientError::Server("500 Internal Server Error: injected".to_string()));
            }
            *left -= 1;
        }
        apply(&mut self.remote.lock().unwrap());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn load(&self) -> Result<ProjectSnapshot, ClientError> {
        self.calls.lock().unwrap().push(Call::Load);
        if *self.fail_loads.lock().unwrap() {
            return Err(ClientError::Server("503 Service Unavailable: injected".to_string()));
        }
        Ok(self.remote_snapshot())
    }

    async fn patch_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> Result<(), ClientError> {
        let id = sprint_id.to_string();
        self.write(Call::PatchSprint(id.clone(), patch.clone()), |remote| {
            if let Some(sprint) = remote.sprints.iter_mut().find(|s| s.id == id) {
                match patch.clone() {
                    SprintPatch::Stories { stories } => sprint.stories = stories,
                    SprintPatch::Details { name, date_range } => {
                        sprint.name = name;
                        sprint.date_range = date_range;
                    }
                    SprintPatch::Status { status } => sprint.status = Some(status),
                }
            }
        })
    }

    async fn post_sprint(&self, sprint: &Sprint) -> Result<(), ClientError> {
        self.write(Call::PostSprint(sprint.id.clone()), |remote| {
            remote.sprints.push(sprint.clone())
        })
    }

    async fn delete_sprint(&self, sprint_id: &str) -> Result<(), ClientError> {
        self.write(Call::DeleteSprint(sprint_id.to_string()), |remote| {
            remote.sprints.retain(|s| s.id != sprint_id)
        })
    }

    async fn put_epic(&self, epic: &Epic) -> Result<(), ClientError> {
        self.write(Call::PutEpic(epic.clone()), |remote| {
            if let Some(slot) = remote.epics.iter_mut().find(|e| e.id == epic.id) {
                *slot = epic.clone();
            }
        })
    }

    async fn post_epic(&self, epic: &Epic) -> Result<(), ClientError> {
        self.write(Call::PostEpic(epic.id.clone()), |remote| {
            remote.epics.push(epic.clone())
        })
    }

    async fn delete_epic(&self, epic_id: &str) -> Result<(), ClientError> {
        self.write(Call::DeleteEpic(epic_id.to_string()), |remote| {
            remote.epics.retain(|e| e.id != epic_id)
        })
    }

    async fn patch_settings_counter(&self, value: u64) -> Result<(), ClientError> {
        self.write(Call::Counter(value), |_| {})
    }

    async fn login(&self) -> Result<LoginCredentials, ClientError> {
        self.calls.lock().unwrap().push(Call::Login);
        Ok(LoginCredentials {
            user: "admin".to_string(),
            password: "secret".to_string(),
        })
    }
}

// ============================================================
// HTTP Fake
// ============================================================

/// json-server style fake: collections are top-level keys of one JSON document.
#[derive(Clone, Default)]
pub struct FakeServer {
    pub db: Arc<Mutex<Value>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeServer {
    /// Make every request to `collection` answer 500.
    pub fn fail(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }

    fn check(&self, collection: &str) -> Result<(), StatusCode> {
        if self.failing.lock().unwrap().contains(collection) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }
}

pub fn sample_db() -> Value {
    json!({
        "sprints": [
            { "id": "backlog", "name": "Backlog", "weeks": "", "stories": [] },
            { "id": "sprint-1", "name": "Sprint 1", "weeks": "Jan 01 - Jan 14", "status": "active", "stories": [
                { "id": "SPK-1", "title": "Login page", "status": "todo", "sp": 3, "epic": "Website", "assignee": "Ana" },
                { "id": "SPK-2", "title": "Push alerts", "status": "blocked", "sp": 5, "epic": "Mobile", "priority": "low" }
            ]}
        ],
        "epics": [
            { "id": "epic-1", "name": "Website", "iconName": "BookIcon", "color": "bg-blue-500", "total": 99 },
            { "id": "epic-2", "name": "Mobile", "iconName": "SmartphoneIcon", "color": "bg-pink-500", "owner": "Luis" }
        ],
        "assignees": [ { "id": "1", "name": "Ana" } ],
        "settings": { "lastStoryId": 2 },
        "login": { "user": "admin", "password": "secret" }
    })
}

/// Serve `db` on an ephemeral local port; returns the base URL and a handle.
pub async fn spawn_fake(db: Value) -> (String, FakeServer) {
    let fake = FakeServer {
        db: Arc::new(Mutex::new(db)),
        ..Default::default()
    };
    let app = Router::new()
        .route(
            "/{collection}",
            get(list_collection).post(create_item).patch(patch_singular),
        )
        .route(
            "/{collection}/{id}",
            patch(patch_item).put(replace_item).delete(delete_item),
        )
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake store");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake store crashed");
    });

    (format!("http://{}", addr), fake)
}

fn merge(target: &mut Value, body: Value) {
    if let (Some(target), Value::Object(fields)) = (target.as_object_mut(), body) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

async fn list_collection(
    State(fake): State<FakeServer>,
    Path(collection): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    fake.check(&collection)?;
    let db = fake.db.lock().unwrap();
    db.get(&collection).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_item(
    State(fake): State<FakeServer>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    fake.check(&collection)?;
    let mut db = fake.db.lock().unwrap();
    let items = db
        .get_mut(&collection)
        .and_then(Value::as_array_mut)
        .ok_or(StatusCode::NOT_FOUND)?;
    items.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn patch_singular(
    State(fake): State<FakeServer>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fake.check(&collection)?;
    let mut db = fake.db.lock().unwrap();
    let target = db
        .get_mut(&collection)
        .filter(|v| v.is_object())
        .ok_or(StatusCode::NOT_FOUND)?;
    merge(target, body);
    Ok(Json(target.clone()))
}

fn find_item<'a>(db: &'a mut Value, collection: &str, id: &str) -> Option<&'a mut Value> {
    db.get_mut(collection)?
        .as_array_mut()?
        .iter_mut()
        .find(|item| item["id"] == id)
}

async fn patch_item(
    State(fake): State<FakeServer>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fake.check(&collection)?;
    let mut db = fake.db.lock().unwrap();
    let item = find_item(&mut db, &collection, &id).ok_or(StatusCode::NOT_FOUND)?;
    merge(item, body);
    Ok(Json(item.clone()))
}

async fn replace_item(
    State(fake): State<FakeServer>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fake.check(&collection)?;
    let mut db = fake.db.lock().unwrap();
    let item = find_item(&mut db, &collection, &id).ok_or(StatusCode::NOT_FOUND)?;
    *item = body;
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(fake): State<FakeServer>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    fake.check(&collection)?;
    let mut db = fake.db.lock().unwrap();
    let items = db
        .get_mut(&collection)
        .and_then(Value::as_array_mut)
        .ok_or(StatusCode::NOT_FOUND)?;
    let before = items.len();
    items.retain(|item| item["id"] != id);
    if items.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({})))
}
