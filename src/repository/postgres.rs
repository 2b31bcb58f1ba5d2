//! Postgres backend

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres, Transaction};

use super::{Store, StoreTx};
use crate::error::{AppError, AppResult};

/// Store backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open Postgres transaction; rolled back on drop unless committed
pub struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTx {
    /// Connection of the open transaction
    pub(crate) fn conn(&mut self) -> AppResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal("Transaction already committed".to_string()))
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(&mut self) -> AppResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::Internal("Transaction already committed".to_string()))?;
        tx.commit().await?;
        Ok(())
    }
}
