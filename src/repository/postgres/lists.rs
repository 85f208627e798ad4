use async_trait::async_trait;

use super::{bind_args, rollback, PgStore};
use crate::error::AppError;
use crate::models::{TodoList, TodoListInput, UpdateListInput};
use crate::repository::access::{LIST_OWNER_JOIN, TODO_LISTS_TABLE};
use crate::repository::update::{SqlArg, UpdateBuilder};
use crate::repository::{ListStore, WriteOp};

impl PgStore {
    async fn insert_list(&self, user_id: i32, list: &TodoListInput) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i32>(
            "INSERT INTO todo_lists (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&list.title)
        .bind(&list.description)
        .fetch_one(&mut *tx)
        .await;
        let list_id = match inserted {
            Ok(id) => id,
            Err(e) => return Err(rollback(tx, e).await),
        };

        let linked = sqlx::query("INSERT INTO users_lists (user_id, list_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(list_id)
            .execute(&mut *tx)
            .await;
        if let Err(e) = linked {
            return Err(rollback(tx, e).await);
        }

        tx.commit().await?;
        Ok(list_id)
    }

    /// Drops the caller's ownership row, then the list and its items once no owner is left.
    async fn remove_list(&self, user_id: i32, list_id: i32) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let unlinked = sqlx::query("DELETE FROM users_lists WHERE user_id = $1 AND list_id = $2")
            .bind(user_id)
            .bind(list_id)
            .execute(&mut *tx)
            .await;
        let removed = match unlinked {
            Ok(result) => result.rows_affected(),
            Err(e) => return Err(rollback(tx, e).await),
        };

        if removed > 0 {
            let items = sqlx::query(
                "DELETE FROM todo_items ti USING lists_items li \
                 WHERE ti.id = li.item_id AND li.list_id = $1 \
                 AND NOT EXISTS (SELECT 1 FROM users_lists ul WHERE ul.list_id = $1) \
                 AND NOT EXISTS (SELECT 1 FROM lists_items other \
                                 WHERE other.item_id = ti.id AND other.list_id <> $1)",
            )
            .bind(list_id)
            .execute(&mut *tx)
            .await;
            if let Err(e) = items {
                return Err(rollback(tx, e).await);
            }

            let list = sqlx::query(
                "DELETE FROM todo_lists tl WHERE tl.id = $1 \
                 AND NOT EXISTS (SELECT 1 FROM users_lists ul WHERE ul.list_id = tl.id)",
            )
            .bind(list_id)
            .execute(&mut *tx)
            .await;
            if let Err(e) = list {
                return Err(rollback(tx, e).await);
            }
        }

        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl ListStore for PgStore {
    async fn create(&self, user_id: i32, list: &TodoListInput) -> Result<i32, AppError> {
        let id = self.timed(self.insert_list(user_id, list)).await?;
        self.emit(TODO_LISTS_TABLE, WriteOp::Create, id, Some(user_id), 1);
        Ok(id)
    }

    async fn get_all(&self, user_id: i32) -> Result<Vec<TodoList>, AppError> {
        let sql = format!(
            "SELECT tl.id, tl.title, tl.description FROM todo_lists tl {} \
             WHERE ul.user_id = $1 ORDER BY tl.id",
            LIST_OWNER_JOIN
        );
        self.timed(async {
            let lists = sqlx::query_as::<_, TodoList>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(lists)
        })
        .await
    }

    async fn get_by_id(&self, user_id: i32, list_id: i32) -> Result<TodoList, AppError> {
        let sql = format!(
            "SELECT tl.id, tl.title, tl.description FROM todo_lists tl {} \
             WHERE ul.user_id = $1 AND ul.list_id = $2",
            LIST_OWNER_JOIN
        );
        self.timed(async {
            sqlx::query_as::<_, TodoList>(&sql)
                .bind(user_id)
                .bind(list_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("list not found".into()))
        })
        .await
    }

    async fn update(
        &self,
        user_id: i32,
        list_id: i32,
        input: &UpdateListInput,
    ) -> Result<u64, AppError> {
        let statement = UpdateBuilder::new()
            .set("title", input.title.clone())
            .set("description", input.description.clone())
            .build(
                vec![SqlArg::Int(list_id), SqlArg::Int(user_id)],
                |set, scope| {
                    format!(
                        "UPDATE todo_lists tl SET {} FROM users_lists ul \
                         WHERE tl.id = ul.list_id AND ul.list_id = {} AND ul.user_id = {}",
                        set, scope[0], scope[1]
                    )
                },
            )?;
        log::debug!("update query: {} args: {:?}", statement.sql, statement.args);

        let rows = self
            .timed(async {
                let result = bind_args(sqlx::query(&statement.sql), statement.args)
                    .execute(&self.pool)
                    .await?;
                Ok(result.rows_affected())
            })
            .await?;

        self.emit(TODO_LISTS_TABLE, WriteOp::Update, list_id, Some(user_id), rows);
        Ok(rows)
    }

    async fn delete(&self, user_id: i32, list_id: i32) -> Result<u64, AppError> {
        let rows = self.timed(self.remove_list(user_id, list_id)).await?;
        self.emit(TODO_LISTS_TABLE, WriteOp::Delete, list_id, Some(user_id), rows);
        Ok(rows)
    }
}
