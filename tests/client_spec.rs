//! HttpStore, login and the board end to end against a local fake store.

mod common;

use common::*;
use serde_json::json;
use scrum_board::auth::{self, LoginError};
use scrum_board::board::*;
use scrum_board::models::*;
use scrum_board::store::{ClientError, DocumentStore, HttpStore, SprintPatch};
use scrum_board::views::Column;

async fn setup() -> (HttpStore, FakeServer) {
    let (url, fake) = spawn_fake(sample_db()).await;
    (HttpStore::new(url), fake)
}

mod load {
    use super::*;

    #[tokio::test]
    async fn parses_wire_names() {
        let (store, _fake) = setup().await;

        let snapshot = store.load().await.expect("Failed to load");

        assert_eq!(snapshot.sprints().len(), 2);
        assert_eq!(snapshot.sprint(BACKLOG_ID).unwrap().status, None);
        assert!(snapshot.sprint("sprint-1").unwrap().is_active());

        let (sprint, story) = snapshot.find_story("SPK-2").unwrap();
        assert_eq!(sprint.id, "sprint-1");
        assert_eq!(story.status, StoryStatus::Blocked);
        assert_eq!(story.story_points, 5);
        assert_eq!(story.epic_name, "Mobile");
        assert_eq!(story.assignee, None);

        let mobile = snapshot.epic("epic-2").unwrap();
        assert_eq!(mobile.icon_key, "SmartphoneIcon");
        assert_eq!(mobile.color_key, "bg-pink-500");
        assert_eq!(mobile.total, 0);
        assert_eq!(snapshot.assignees()[0].name, "Ana");
    }

    #[tokio::test]
    async fn one_failing_collection_fails_the_load() {
        let (store, fake) = setup().await;
        fake.fail("epics");

        let result = store.load().await;

        assert!(matches!(result, Err(ClientError::Server(_))));
    }
}

mod writes {
    use super::*;

    #[tokio::test]
    async fn patches_sprint_stories() {
        let (store, fake) = setup().await;
        let stories = vec![story("SPK-7", StoryStatus::Done, 2, "Website")];

        store
            .patch_sprint_stories("sprint-1", &stories)
            .await
            .expect("Failed to patch");

        let db = fake.db.lock().unwrap();
        let saved = &db["sprints"][1];
        assert_eq!(saved["stories"][0]["id"], "SPK-7");
        assert_eq!(saved["stories"][0]["status"], "done");
        assert_eq!(saved["stories"][0]["sp"], 2);
        assert_eq!(saved["name"], "Sprint 1");
    }

    #[tokio::test]
    async fn patches_sprint_status() {
        let (store, fake) = setup().await;

        store
            .patch_sprint(
                "sprint-1",
                &SprintPatch::Status {
                    status: SprintStatus::Completed,
                },
            )
            .await
            .expect("Failed to patch");

        assert_eq!(fake.db.lock().unwrap()["sprints"][1]["status"], "completed");
    }

    #[tokio::test]
    async fn replaces_creates_and_deletes_epics() {
        let (store, fake) = setup().await;

        let mut website = epic("epic-1", "Website");
        website.total = 3;
        store.put_epic(&website).await.expect("Failed to put");
        store
            .post_epic(&epic("epic-9", "Docs"))
            .await
            .expect("Failed to post");
        store.delete_epic("epic-2").await.expect("Failed to delete");

        let db = fake.db.lock().unwrap();
        assert_eq!(
            db["epics"],
            json!([
                { "id": "epic-1", "name": "Website", "iconName": DEFAULT_EPIC_ICON, "color": DEFAULT_EPIC_COLOR, "total": 3 },
                { "id": "epic-9", "name": "Docs", "iconName": DEFAULT_EPIC_ICON, "color": DEFAULT_EPIC_COLOR, "total": 0 }
            ])
        );
    }

    #[tokio::test]
    async fn posts_and_deletes_sprints() {
        let (store, fake) = setup().await;

        store
            .post_sprint(&sprint("sprint-2", None, vec![]))
            .await
            .expect("Failed to post");
        assert_eq!(fake.db.lock().unwrap()["sprints"][2]["weeks"], "Jan 01 - Jan 14");

        store.delete_sprint("sprint-2").await.expect("Failed to delete");
        assert_eq!(fake.db.lock().unwrap()["sprints"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn records_story_counter() {
        let (store, fake) = setup().await;

        store.patch_settings_counter(7).await.expect("Failed to patch");

        assert_eq!(fake.db.lock().unwrap()["settings"], json!({ "lastStoryId": 7 }));
    }

    #[tokio::test]
    async fn missing_entity_is_not_found() {
        let (store, _fake) = setup().await;

        let result = store.delete_sprint("nope").await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn accepts_matching_credentials() {
        let (store, _fake) = setup().await;

        assert!(auth::login(&store, "admin", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let (store, _fake) = setup().await;

        let result = auth::login(&store, "admin", "guess").await;

        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn reports_unreachable_store() {
        let store = HttpStore::new("http://127.0.0.1:1");

        let result = auth::login(&store, "admin", "secret").await;

        assert!(matches!(result, Err(LoginError::Unreachable(_))));
    }
}

mod board {
    use super::*;

    #[tokio::test]
    async fn create_and_drop_reach_the_store() {
        let (store, fake) = setup().await;
        let mut board = Board::load(store).await.expect("Failed to load board");

        let outcome = board
            .create_story(
                "sprint-1",
                StoryDraft {
                    title: "Checkout".to_string(),
                    status: StoryStatus::Todo,
                    story_points: 8,
                    epic_name: "Website".to_string(),
                    assignee: None,
                    details: Some("Card payments only".to_string()),
                },
            )
            .await
            .expect("Failed to create");
        assert_eq!(outcome, Outcome::Created("SPK-3".to_string()));

        board
            .drop_on_column("SPK-1", Column::Done)
            .await
            .expect("Failed to drop");

        let db = fake.db.lock().unwrap().clone();
        assert_eq!(db["settings"]["lastStoryId"], 3);
        let stories = &db["sprints"][1]["stories"];
        assert_eq!(stories[0]["status"], "done");
        assert_eq!(stories[2]["id"], "SPK-3");
        assert_eq!(stories[2]["details"], "Card payments only");
        assert!(stories[2].get("assignee").is_none());

        let reloaded = HttpStore::new(board.store().base_url()).load().await.unwrap();
        assert_eq!(reloaded, *board.snapshot());
    }

    #[tokio::test]
    async fn stored_epic_total_is_not_trusted() {
        let (store, _fake) = setup().await;
        let board = Board::load(store).await.expect("Failed to load board");

        let totals = board.epics_with_totals();

        assert_eq!(totals[0].total, 3);
        assert_eq!(totals[1].total, 5);
        assert_eq!(board.sprint_stats(BACKLOG_ID).map(|s| s.total), Some(0));
        assert_eq!(board.stats().blocked, 1);
    }

    #[tokio::test]
    async fn unreachable_store_after_failed_write_marks_board_stale() {
        let (store, fake) = setup().await;
        let mut board = Board::load(store).await.expect("Failed to load board");
        fake.fail("sprints");

        let result = board.toggle_status("SPK-1").await;

        assert!(matches!(
            result,
            Err(BoardError::Persist { resynced: false, .. })
        ));
        assert!(board.is_stale());
    }

    #[tokio::test]
    async fn unknown_story_fields_survive_a_sibling_update() {
        let (store, fake) = setup().await;
        let mut board = Board::load(store).await.expect("Failed to load board");

        board.toggle_status("SPK-1").await.expect("Failed to toggle");

        let db = fake.db.lock().unwrap().clone();
        let stories = &db["sprints"][1]["stories"];
        assert_eq!(stories[0]["status"], "in-progress");
        assert_eq!(stories[1]["priority"], "low");
        assert!(stories[0].get("priority").is_none());
    }

    #[tokio::test]
    async fn edits_keep_fields_the_form_does_not_show() {
        let (store, fake) = setup().await;
        let mut board = Board::load(store).await.expect("Failed to load board");

        board
            .edit_story(
                "SPK-2",
                BACKLOG_ID,
                StoryDraft {
                    title: "Push alerts v2".to_string(),
                    status: StoryStatus::Blocked,
                    story_points: 3,
                    epic_name: "Mobile".to_string(),
                    assignee: None,
                    details: None,
                },
            )
            .await
            .expect("Failed to edit story");
        board
            .edit_epic(
                "epic-2",
                EpicDraft {
                    name: "Mobile".to_string(),
                    icon_key: "ZapIcon".to_string(),
                    color_key: "bg-red-500".to_string(),
                },
            )
            .await
            .expect("Failed to edit epic");

        let db = fake.db.lock().unwrap().clone();
        let moved = &db["sprints"][0]["stories"][0];
        assert_eq!(moved["id"], "SPK-2");
        assert_eq!(moved["title"], "Push alerts v2");
        assert_eq!(moved["status"], "todo");
        assert_eq!(moved["priority"], "low");
        assert_eq!(db["epics"][1]["iconName"], "ZapIcon");
        assert_eq!(db["epics"][1]["owner"], "Luis");
    }
}
