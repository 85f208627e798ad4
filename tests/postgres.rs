//! Store tests against a live PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a scratch database and `--ignored`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dotenv::dotenv;
use pretty_assertions::assert_eq;
use sqlx::PgPool;

use todo_lists::error::AppError;
use todo_lists::models::{NewUser, TodoItemInput, TodoListInput, UpdateItemInput, UpdateListInput};
use todo_lists::repository::{
    CredentialStore, ItemStore, ListStore, PgStore, WriteEvent, WriteObserver, WriteOp,
};

async fn store() -> PgStore {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    let store = PgStore::new(pool, Duration::from_secs(5));
    store.migrate().await.expect("migrations");
    store
}

async fn fresh_user(store: &PgStore, username: &str) -> i32 {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(store.pool())
        .await;
    store
        .create_user(NewUser {
            name: username.to_string(),
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect("create user")
}

async fn count(store: &PgStore, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(store.pool())
        .await
        .expect("count")
}

#[ignore]
#[actix_rt::test]
async fn test_pg_list_create_get_update_delete() {
    let store = store().await;
    let user = fresh_user(&store, "pg_list_user").await;

    let input = TodoListInput {
        title: "Groceries".into(),
        description: "weekly".into(),
    };
    let list_id = ListStore::create(&store, user, &input).await.unwrap();

    let list = ListStore::get_by_id(&store, user, list_id).await.unwrap();
    assert_eq!(list.title, "Groceries");
    assert_eq!(list.description, "weekly");

    let update = UpdateListInput {
        title: Some("X".into()),
        description: None,
    };
    assert_eq!(ListStore::update(&store, user, list_id, &update).await.unwrap(), 1);
    let list = ListStore::get_by_id(&store, user, list_id).await.unwrap();
    assert_eq!(list.title, "X");
    assert_eq!(list.description, "weekly");

    assert_eq!(ListStore::delete(&store, user, list_id).await.unwrap(), 1);
    assert_eq!(ListStore::delete(&store, user, list_id).await.unwrap(), 0);
}

#[ignore]
#[actix_rt::test]
async fn test_pg_item_create_rolls_back_on_missing_list() {
    let store = store().await;
    let before = count(&store, "todo_items").await;

    let input = TodoItemInput {
        title: "Orphan".into(),
        description: String::new(),
    };
    let result = ItemStore::create(&store, i32::MAX, &input).await;

    assert!(matches!(result, Err(AppError::DatabaseError(_))));
    assert_eq!(count(&store, "todo_items").await, before);
}

#[ignore]
#[actix_rt::test]
async fn test_pg_ownership_isolation() {
    let store = store().await;
    let owner = fresh_user(&store, "pg_owner").await;
    let other = fresh_user(&store, "pg_other").await;

    let list_id = ListStore::create(
        &store,
        owner,
        &TodoListInput {
            title: "Owner only".into(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    let item_id = ItemStore::create(
        &store,
        list_id,
        &TodoItemInput {
            title: "Item".into(),
            description: "desc".into(),
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        ListStore::get_by_id(&store, other, list_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(ItemStore::get_all(&store, other, list_id).await.unwrap().is_empty());

    let done = UpdateItemInput {
        done: Some(true),
        ..Default::default()
    };
    assert_eq!(ItemStore::update(&store, other, item_id, &done).await.unwrap(), 0);
    assert_eq!(ItemStore::delete(&store, other, item_id).await.unwrap(), 0);

    assert_eq!(ItemStore::update(&store, owner, item_id, &done).await.unwrap(), 1);
    let item = ItemStore::get_by_id(&store, owner, item_id).await.unwrap();
    assert!(item.done);
    assert_eq!(item.title, "Item");
    assert_eq!(item.description, "desc");

    // Deleting the last ownership takes the item with the list.
    assert_eq!(ListStore::delete(&store, owner, list_id).await.unwrap(), 1);
    assert!(matches!(
        ItemStore::get_by_id(&store, owner, item_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[ignore]
#[actix_rt::test]
async fn test_pg_duplicate_username_conflicts() {
    let store = store().await;
    fresh_user(&store, "pg_dupe").await;

    let result = store
        .create_user(NewUser {
            name: "again".into(),
            username: "pg_dupe".into(),
            password_hash: "x".into(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<WriteEvent>>,
}

impl WriteObserver for RecordingObserver {
    fn on_write(&self, event: &WriteEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[ignore]
#[actix_rt::test]
async fn test_pg_writes_reach_observer() {
    let observer = Arc::new(RecordingObserver::default());
    let store = store().await.with_observer(observer.clone());
    let user = fresh_user(&store, "pg_observed").await;

    let list_id = ListStore::create(
        &store,
        user,
        &TodoListInput {
            title: "Observed".into(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    let rename = UpdateListInput {
        title: Some("Renamed".into()),
        description: None,
    };
    ListStore::update(&store, user, list_id, &rename).await.unwrap();
    ListStore::delete(&store, user, list_id).await.unwrap();

    // A rolled back create is not reported.
    let input = TodoItemInput {
        title: "Orphan".into(),
        description: String::new(),
    };
    assert!(ItemStore::create(&store, i32::MAX, &input).await.is_err());

    let events = observer.events.lock().unwrap();
    let ops: Vec<(&str, WriteOp, u64)> = events
        .iter()
        .map(|e| (e.entity, e.op, e.rows_affected))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("users", WriteOp::Create, 1),
            ("todo_lists", WriteOp::Create, 1),
            ("todo_lists", WriteOp::Update, 1),
            ("todo_lists", WriteOp::Delete, 1),
        ]
    );
    assert!(events[1..].iter().all(|e| e.user_id == Some(user)));
}
