//! In-memory store.
//!
//! Mirrors the PostgreSQL schema: entity maps plus the two relation tables, foreign
//! key checks on relation inserts and a unique username. Transactions are modelled by
//! working on a copy of the state and swapping it in on commit, so a failed relation
//! insert leaves no trace of the entity inserted before it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::access::{
    self, Membership, Ownership, TODO_ITEMS_TABLE, TODO_LISTS_TABLE, USERS_TABLE,
};
use super::events::{LogObserver, WriteEvent, WriteObserver, WriteOp};
use super::{CredentialStore, ItemStore, ListStore};
use crate::error::AppError;
use crate::models::{
    NewUser, TodoItem, TodoItemInput, TodoList, TodoListInput, UpdateItemInput, UpdateListInput,
    UserCredentials,
};

#[derive(Debug, Clone)]
struct StoredUser {
    #[allow(dead_code)]
    name: String,
    username: String,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
struct State {
    users: BTreeMap<i32, StoredUser>,
    lists: BTreeMap<i32, TodoList>,
    items: BTreeMap<i32, TodoItem>,
    owners: Vec<Ownership>,
    members: Vec<Membership>,
    next_user_id: i32,
    next_list_id: i32,
    next_item_id: i32,
}

impl State {
    fn insert_ownership(&mut self, user_id: i32, list_id: i32) -> Result<(), AppError> {
        if !self.users.contains_key(&user_id) || !self.lists.contains_key(&list_id) {
            return Err(AppError::DatabaseError(format!(
                "insert into users_lists violates foreign key (user_id={}, list_id={})",
                user_id, list_id
            )));
        }
        self.owners.push(Ownership { user_id, list_id });
        Ok(())
    }

    fn insert_membership(&mut self, list_id: i32, item_id: i32) -> Result<(), AppError> {
        if !self.lists.contains_key(&list_id) || !self.items.contains_key(&item_id) {
            return Err(AppError::DatabaseError(format!(
                "insert into lists_items violates foreign key (list_id={}, item_id={})",
                list_id, item_id
            )));
        }
        self.members.push(Membership { list_id, item_id });
        Ok(())
    }

    /// Deletes the list, its relation rows and the items only it referenced.
    fn remove_list(&mut self, list_id: i32) {
        self.lists.remove(&list_id);
        self.owners.retain(|o| o.list_id != list_id);
        let orphaned: Vec<i32> = self
            .members
            .iter()
            .filter(|m| m.list_id == list_id)
            .map(|m| m.item_id)
            .collect();
        self.members.retain(|m| m.list_id != list_id);
        for item_id in orphaned {
            if !self.members.iter().any(|m| m.item_id == item_id) {
                self.items.remove(&item_id);
            }
        }
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    observer: Arc<dyn WriteObserver>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(LogObserver))
    }

    pub fn with_observer(observer: Arc<dyn WriteObserver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            observer,
        }
    }

    /// Number of stored lists, owned or not.
    pub fn list_count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.lists.len())
    }

    /// Number of stored items, linked or not.
    pub fn item_count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.items.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".into()))
    }

    fn emit(&self, entity: &'static str, op: WriteOp, entity_id: i32, user_id: Option<i32>, rows: u64) {
        self.observer.on_write(&WriteEvent {
            entity,
            op,
            entity_id,
            user_id,
            rows_affected: rows,
        });
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<i32, AppError> {
        let id = {
            let mut state = self.lock()?;
            if state.users.values().any(|u| u.username == user.username) {
                return Err(AppError::Conflict(format!(
                    "username {} is already taken",
                    user.username
                )));
            }
            state.next_user_id += 1;
            let id = state.next_user_id;
            state.users.insert(
                id,
                StoredUser {
                    name: user.name,
                    username: user.username,
                    password_hash: user.password_hash,
                },
            );
            id
        };
        self.emit(USERS_TABLE, WriteOp::Create, id, Some(id), 1);
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, AppError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|(_, u)| u.username == username)
            .map(|(id, u)| UserCredentials {
                id: *id,
                password_hash: u.password_hash.clone(),
            }))
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn create(&self, user_id: i32, list: &TodoListInput) -> Result<i32, AppError> {
        let id = {
            let mut state = self.lock()?;
            let mut tx = state.clone();
            tx.next_list_id += 1;
            let id = tx.next_list_id;
            tx.lists.insert(
                id,
                TodoList {
                    id,
                    title: list.title.clone(),
                    description: list.description.clone(),
                },
            );
            tx.insert_ownership(user_id, id)?;
            *state = tx;
            id
        };
        self.emit(TODO_LISTS_TABLE, WriteOp::Create, id, Some(user_id), 1);
        Ok(id)
    }

    async fn get_all(&self, user_id: i32) -> Result<Vec<TodoList>, AppError> {
        let state = self.lock()?;
        Ok(access::lists_of(&state.owners, user_id)
            .into_iter()
            .filter_map(|id| state.lists.get(&id).cloned())
            .collect())
    }

    async fn get_by_id(&self, user_id: i32, list_id: i32) -> Result<TodoList, AppError> {
        let state = self.lock()?;
        if !access::can_access_list(&state.owners, user_id, list_id) {
            return Err(AppError::NotFound("list not found".into()));
        }
        state
            .lists
            .get(&list_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("list not found".into()))
    }

    async fn update(
        &self,
        user_id: i32,
        list_id: i32,
        input: &UpdateListInput,
    ) -> Result<u64, AppError> {
        if input.is_empty() {
            return Err(AppError::BadRequest("update structure has no values".into()));
        }
        let rows = {
            let mut state = self.lock()?;
            if !access::can_access_list(&state.owners, user_id, list_id) {
                0
            } else if let Some(list) = state.lists.get_mut(&list_id) {
                if let Some(title) = &input.title {
                    list.title = title.clone();
                }
                if let Some(description) = &input.description {
                    list.description = description.clone();
                }
                1
            } else {
                0
            }
        };
        self.emit(TODO_LISTS_TABLE, WriteOp::Update, list_id, Some(user_id), rows);
        Ok(rows)
    }

    async fn delete(&self, user_id: i32, list_id: i32) -> Result<u64, AppError> {
        let rows = {
            let mut state = self.lock()?;
            let before = state.owners.len();
            state
                .owners
                .retain(|o| !(o.user_id == user_id && o.list_id == list_id));
            let removed = (before - state.owners.len()) as u64;
            if removed > 0 && !state.owners.iter().any(|o| o.list_id == list_id) {
                state.remove_list(list_id);
            }
            removed
        };
        self.emit(TODO_LISTS_TABLE, WriteOp::Delete, list_id, Some(user_id), rows);
        Ok(rows)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn create(&self, list_id: i32, item: &TodoItemInput) -> Result<i32, AppError> {
        let id = {
            let mut state = self.lock()?;
            let mut tx = state.clone();
            tx.next_item_id += 1;
            let id = tx.next_item_id;
            tx.items.insert(
                id,
                TodoItem {
                    id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                    done: false,
                },
            );
            tx.insert_membership(list_id, id)?;
            *state = tx;
            id
        };
        self.emit(TODO_ITEMS_TABLE, WriteOp::Create, id, None, 1);
        Ok(id)
    }

    async fn get_all(&self, user_id: i32, list_id: i32) -> Result<Vec<TodoItem>, AppError> {
        let state = self.lock()?;
        Ok(
            access::items_in_list(&state.owners, &state.members, user_id, list_id)
                .into_iter()
                .filter_map(|id| state.items.get(&id).cloned())
                .collect(),
        )
    }

    async fn get_by_id(&self, user_id: i32, item_id: i32) -> Result<TodoItem, AppError> {
        let state = self.lock()?;
        if !access::can_access_item(&state.owners, &state.members, user_id, item_id) {
            return Err(AppError::NotFound("item not found".into()));
        }
        state
            .items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("item not found".into()))
    }

    async fn update(
        &self,
        user_id: i32,
        item_id: i32,
        input: &UpdateItemInput,
    ) -> Result<u64, AppError> {
        if input.is_empty() {
            return Err(AppError::BadRequest("update structure has no values".into()));
        }
        let rows = {
            let mut state = self.lock()?;
            if !access::can_access_item(&state.owners, &state.members, user_id, item_id) {
                0
            } else if let Some(item) = state.items.get_mut(&item_id) {
                if let Some(title) = &input.title {
                    item.title = title.clone();
                }
                if let Some(description) = &input.description {
                    item.description = description.clone();
                }
                if let Some(done) = input.done {
                    item.done = done;
                }
                1
            } else {
                0
            }
        };
        self.emit(TODO_ITEMS_TABLE, WriteOp::Update, item_id, Some(user_id), rows);
        Ok(rows)
    }

    async fn delete(&self, user_id: i32, item_id: i32) -> Result<u64, AppError> {
        let rows = {
            let mut state = self.lock()?;
            if access::can_access_item(&state.owners, &state.members, user_id, item_id)
                && state.items.remove(&item_id).is_some()
            {
                state.members.retain(|m| m.item_id != item_id);
                1
            } else {
                0
            }
        };
        self.emit(TODO_ITEMS_TABLE, WriteOp::Delete, item_id, Some(user_id), rows);
        Ok(rows)
    }
}
