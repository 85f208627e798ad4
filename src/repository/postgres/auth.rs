use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::models::{NewUser, UserCredentials};
use crate::repository::access::USERS_TABLE;
use crate::repository::{CredentialStore, WriteOp};

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<i32, AppError> {
        let id = self
            .timed(async {
                sqlx::query_scalar::<_, i32>(
                    "INSERT INTO users (name, username, password_hash) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(&user.name)
                .bind(&user.username)
                .bind(&user.password_hash)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match AppError::from(e) {
                    AppError::Conflict(_) => AppError::Conflict(format!(
                        "username {} is already taken",
                        user.username
                    )),
                    other => other,
                })
            })
            .await?;

        self.emit(USERS_TABLE, WriteOp::Create, id, Some(id), 1);
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, AppError> {
        self.timed(async {
            let credentials = sqlx::query_as::<_, UserCredentials>(
                "SELECT id, password_hash FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
            Ok(credentials)
        })
        .await
    }
}
