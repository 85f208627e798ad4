use async_trait::async_trait;

use super::{bind_args, rollback, PgStore};
use crate::error::AppError;
use crate::models::{TodoItem, TodoItemInput, UpdateItemInput};
use crate::repository::access::{ITEM_OWNER_JOIN, TODO_ITEMS_TABLE};
use crate::repository::update::{SqlArg, UpdateBuilder};
use crate::repository::{ItemStore, WriteOp};

impl PgStore {
    async fn insert_item(&self, list_id: i32, item: &TodoItemInput) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i32>(
            "INSERT INTO todo_items (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&item.title)
        .bind(&item.description)
        .fetch_one(&mut *tx)
        .await;
        let item_id = match inserted {
            Ok(id) => id,
            Err(e) => return Err(rollback(tx, e).await),
        };

        let linked = sqlx::query("INSERT INTO lists_items (list_id, item_id) VALUES ($1, $2)")
            .bind(list_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await;
        if let Err(e) = linked {
            return Err(rollback(tx, e).await);
        }

        tx.commit().await?;
        Ok(item_id)
    }
}

#[async_trait]
impl ItemStore for PgStore {
    async fn create(&self, list_id: i32, item: &TodoItemInput) -> Result<i32, AppError> {
        let id = self.timed(self.insert_item(list_id, item)).await?;
        self.emit(TODO_ITEMS_TABLE, WriteOp::Create, id, None, 1);
        Ok(id)
    }

    async fn get_all(&self, user_id: i32, list_id: i32) -> Result<Vec<TodoItem>, AppError> {
        let sql = format!(
            "SELECT ti.id, ti.title, ti.description, ti.done FROM todo_items ti {} \
             WHERE li.list_id = $1 AND ul.user_id = $2 ORDER BY ti.id",
            ITEM_OWNER_JOIN
        );
        self.timed(async {
            let items = sqlx::query_as::<_, TodoItem>(&sql)
                .bind(list_id)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(items)
        })
        .await
    }

    async fn get_by_id(&self, user_id: i32, item_id: i32) -> Result<TodoItem, AppError> {
        let sql = format!(
            "SELECT ti.id, ti.title, ti.description, ti.done FROM todo_items ti {} \
             WHERE ti.id = $1 AND ul.user_id = $2 LIMIT 1",
            ITEM_OWNER_JOIN
        );
        self.timed(async {
            sqlx::query_as::<_, TodoItem>(&sql)
                .bind(item_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("item not found".into()))
        })
        .await
    }

    async fn update(
        &self,
        user_id: i32,
        item_id: i32,
        input: &UpdateItemInput,
    ) -> Result<u64, AppError> {
        let statement = UpdateBuilder::new()
            .set("title", input.title.clone())
            .set("description", input.description.clone())
            .set("done", input.done)
            .build(
                vec![SqlArg::Int(user_id), SqlArg::Int(item_id)],
                |set, scope| {
                    format!(
                        "UPDATE todo_items ti SET {} FROM lists_items li, users_lists ul \
                         WHERE li.item_id = ti.id AND ul.list_id = li.list_id \
                         AND ul.user_id = {} AND ti.id = {}",
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

        self.emit(TODO_ITEMS_TABLE, WriteOp::Update, item_id, Some(user_id), rows);
        Ok(rows)
    }

    async fn delete(&self, user_id: i32, item_id: i32) -> Result<u64, AppError> {
        let rows = self
            .timed(async {
                let result = sqlx::query(
                    "DELETE FROM todo_items ti USING lists_items li, users_lists ul \
                     WHERE ti.id = li.item_id AND ul.list_id = li.list_id \
                     AND ul.user_id = $1 AND ti.id = $2",
                )
                .bind(user_id)
                .bind(item_id)
                .execute(&self.pool)
                .await?;
                Ok(result.rows_affected())
            })
            .await?;

        self.emit(TODO_ITEMS_TABLE, WriteOp::Delete, item_id, Some(user_id), rows);
        Ok(rows)
    }
}
