//! Transfer persistence

use async_trait::async_trait;

use super::postgres::PgTx;
use crate::{
    error::AppResult,
    models::{
        enums::TransferStatus,
        transfer::{NewTransfer, Transfer},
    },
};

#[async_trait]
pub trait TransferStore: Send {
    async fn insert_transfer(&mut self, transfer: &NewTransfer) -> AppResult<Transfer>;

    async fn get_transfer(&mut self, id: i32) -> AppResult<Option<Transfer>>;

    /// Write back status and end date
    async fn update_transfer(&mut self, transfer: &Transfer) -> AppResult<()>;

    async fn delete_transfer(&mut self, id: i32) -> AppResult<bool>;

    /// Transfers leaving or reaching the library, newest first
    async fn list_transfers_by_library(&mut self, library_id: i32) -> AppResult<Vec<Transfer>>;

    /// Whether an Accepted transfer sends the copy to `library_id`
    async fn has_accepted_transfer_to(&mut self, copy_id: i32, library_id: i32) -> AppResult<bool>;
}

#[async_trait]
impl TransferStore for PgTx {
    async fn insert_transfer(&mut self, transfer: &NewTransfer) -> AppResult<Transfer> {
        let row = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (physical_copy_id, source_library_id, destination_library_id, start_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(transfer.physical_copy_id)
        .bind(transfer.source_library_id)
        .bind(transfer.destination_library_id)
        .bind(transfer.start_date)
        .bind(TransferStatus::Pending)
        .fetch_one(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn get_transfer(&mut self, id: i32) -> AppResult<Option<Transfer>> {
        let row = sqlx::query_as::<_, Transfer>("SELECT * FROM transfers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(row)
    }

    async fn update_transfer(&mut self, transfer: &Transfer) -> AppResult<()> {
        sqlx::query("UPDATE transfers SET status = $2, end_date = $3 WHERE id = $1")
            .bind(transfer.id)
            .bind(transfer.status)
            .bind(transfer.end_date)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn delete_transfer(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_transfers_by_library(&mut self, library_id: i32) -> AppResult<Vec<Transfer>> {
        let rows = sqlx::query_as::<_, Transfer>(
            r#"
            SELECT * FROM transfers
            WHERE source_library_id = $1 OR destination_library_id = $1
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(library_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn has_accepted_transfer_to(&mut self, copy_id: i32, library_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transfers
                WHERE physical_copy_id = $1 AND destination_library_id = $2 AND status = $3
            )
            "#,
        )
        .bind(copy_id)
        .bind(library_id)
        .bind(TransferStatus::Accepted)
        .fetch_one(self.conn()?)
        .await?;
        Ok(exists)
    }
}
