//! Ownership-scoped data access.
//!
//! Every read, update and delete of a list or item takes the acting user's id and
//! only touches rows reachable from that user through the relation tables. Creates
//! insert the entity and its relation row in one transaction.

pub mod access;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod update;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    NewUser, TodoItem, TodoItemInput, TodoList, TodoListInput, UpdateItemInput, UpdateListInput,
    UserCredentials,
};

pub use events::{LogObserver, WriteEvent, WriteObserver, WriteOp};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persists users and their transformed credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user. A taken username fails with `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<i32, AppError>;

    /// Loads the stored credential for `username`, if any.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, AppError>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    /// Inserts the list and links it to `user_id` atomically.
    async fn create(&self, user_id: i32, list: &TodoListInput) -> Result<i32, AppError>;

    async fn get_all(&self, user_id: i32) -> Result<Vec<TodoList>, AppError>;

    /// Fails with `NotFound` unless `user_id` owns `list_id`.
    async fn get_by_id(&self, user_id: i32, list_id: i32) -> Result<TodoList, AppError>;

    /// Applies the present fields and returns the number of rows changed.
    async fn update(
        &self,
        user_id: i32,
        list_id: i32,
        input: &UpdateListInput,
    ) -> Result<u64, AppError>;

    /// Removes the caller's ownership of the list; the list and its items go with
    /// the last owner. Returns the number of ownership rows removed.
    async fn delete(&self, user_id: i32, list_id: i32) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Inserts the item with `done = false` and links it to `list_id` atomically.
    /// The caller is responsible for checking that the user owns the list.
    async fn create(&self, list_id: i32, item: &TodoItemInput) -> Result<i32, AppError>;

    async fn get_all(&self, user_id: i32, list_id: i32) -> Result<Vec<TodoItem>, AppError>;

    async fn get_by_id(&self, user_id: i32, item_id: i32) -> Result<TodoItem, AppError>;

    async fn update(
        &self,
        user_id: i32,
        item_id: i32,
        input: &UpdateItemInput,
    ) -> Result<u64, AppError>;

    async fn delete(&self, user_id: i32, item_id: i32) -> Result<u64, AppError>;
}

/// The stores handed to the HTTP handlers.
#[derive(Clone)]
pub struct Repository {
    pub credentials: Arc<dyn CredentialStore>,
    pub lists: Arc<dyn ListStore>,
    pub items: Arc<dyn ItemStore>,
}

impl Repository {
    /// Uses one backing store for every concern.
    pub fn new<S>(store: S) -> Self
    where
        S: CredentialStore + ListStore + ItemStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            credentials: store.clone(),
            lists: store.clone(),
            items: store,
        }
    }
}
