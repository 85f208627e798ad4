//! PostgreSQL implementation of the stores.
//!
//! Every public operation runs under the configured query timeout. Creates and list
//! deletes run in a transaction that is rolled back explicitly on the first failure.

mod auth;
mod items;
mod lists;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Postgres, Transaction};

use super::events::{LogObserver, WriteEvent, WriteObserver, WriteOp};
use super::update::SqlArg;
use crate::config::Config;
use crate::error::AppError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    query_timeout: Duration,
    observer: Arc<dyn WriteObserver>,
}

impl PgStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
            observer: Arc::new(LogObserver),
        }
    }

    /// Opens a pool sized and timed according to `config`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.query_timeout())
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool, config.query_timeout()))
    }

    pub fn with_observer(mut self, observer: Arc<dyn WriteObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))
    }

    async fn timed<T, F>(&self, operation: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.query_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(AppError::DatabaseError(format!(
                "operation timed out after {:?}",
                self.query_timeout
            ))),
        }
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

/// Binds the builder's arguments in placeholder order.
fn bind_args(
    mut query: Query<'_, Postgres, PgArguments>,
    args: Vec<SqlArg>,
) -> Query<'_, Postgres, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(value) => query.bind(value),
            SqlArg::Bool(value) => query.bind(value),
            SqlArg::Int(value) => query.bind(value),
        };
    }
    query
}

/// Rolls `tx` back and returns `error` as the failure to propagate.
async fn rollback(tx: Transaction<'_, Postgres>, error: sqlx::Error) -> AppError {
    if let Err(rollback_error) = tx.rollback().await {
        log::warn!("transaction rollback failed: {}", rollback_error);
    }
    error.into()
}
