//! Physical copy persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::postgres::PgTx;
use crate::{
    error::AppResult,
    models::{
        enums::PhysicalCopyStatus,
        physical_copy::{LibraryAvailability, PhysicalCopy},
    },
};

#[async_trait]
pub trait CopyStore: Send {
    async fn insert_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PhysicalCopy>;

    async fn get_copy(&mut self, id: i32) -> AppResult<Option<PhysicalCopy>>;

    async fn list_copies_by_library(&mut self, library_id: i32) -> AppResult<Vec<PhysicalCopy>>;

    /// One AtLibrary copy of `isbn` at `library_id`, lowest id first
    async fn find_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>>;

    /// Atomically move one AtLibrary copy of `isbn` at `library_id` to Requested
    async fn claim_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>>;

    /// Set the copy to `to` only if it is currently `from`; none when it was not
    async fn compare_and_set_copy_status(
        &mut self,
        id: i32,
        from: PhysicalCopyStatus,
        to: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>>;

    /// Unconditional status write
    async fn set_copy_status(
        &mut self,
        id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>>;

    /// Unconditional status and location write
    async fn set_copy_location(
        &mut self,
        id: i32,
        library_id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>>;

    async fn count_available(&mut self, isbn: &str, library_id: i32) -> AppResult<i64>;

    /// AtLibrary copies of `isbn` per library, libraries without any omitted
    async fn availability_by_library(&mut self, isbn: &str) -> AppResult<Vec<LibraryAvailability>>;

    /// Requests and transfers referencing the copy
    async fn count_copy_references(&mut self, id: i32) -> AppResult<i64>;

    async fn delete_copy(&mut self, id: i32) -> AppResult<bool>;
}

#[async_trait]
impl CopyStore for PgTx {
    async fn insert_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PhysicalCopy> {
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            r#"
            INSERT INTO physical_copies (isbn, library_id, status, crea_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(library_id)
        .bind(PhysicalCopyStatus::AtLibrary)
        .bind(now)
        .fetch_one(self.conn()?)
        .await?;

        Ok(copy)
    }

    async fn get_copy(&mut self, id: i32) -> AppResult<Option<PhysicalCopy>> {
        let copy = sqlx::query_as::<_, PhysicalCopy>("SELECT * FROM physical_copies WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(copy)
    }

    async fn list_copies_by_library(&mut self, library_id: i32) -> AppResult<Vec<PhysicalCopy>> {
        let copies = sqlx::query_as::<_, PhysicalCopy>(
            "SELECT * FROM physical_copies WHERE library_id = $1 ORDER BY isbn, id",
        )
        .bind(library_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(copies)
    }

    async fn find_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>> {
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            r#"
            SELECT * FROM physical_copies
            WHERE isbn = $1 AND library_id = $2 AND status = $3
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(isbn)
        .bind(library_id)
        .bind(PhysicalCopyStatus::AtLibrary)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(copy)
    }

    async fn claim_available_copy(
        &mut self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>> {
        // Concurrent claimers skip rows already locked by another transaction
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            r#"
            UPDATE physical_copies SET status = $4
            WHERE id = (
                SELECT id FROM physical_copies
                WHERE isbn = $1 AND library_id = $2 AND status = $3
                ORDER BY id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(library_id)
        .bind(PhysicalCopyStatus::AtLibrary)
        .bind(PhysicalCopyStatus::Requested)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(copy)
    }

    async fn compare_and_set_copy_status(
        &mut self,
        id: i32,
        from: PhysicalCopyStatus,
        to: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            "UPDATE physical_copies SET status = $3 WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(copy)
    }

    async fn set_copy_status(
        &mut self,
        id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            "UPDATE physical_copies SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(copy)
    }

    async fn set_copy_location(
        &mut self,
        id: i32,
        library_id: i32,
        status: PhysicalCopyStatus,
    ) -> AppResult<Option<PhysicalCopy>> {
        let copy = sqlx::query_as::<_, PhysicalCopy>(
            "UPDATE physical_copies SET library_id = $2, status = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(library_id)
        .bind(status)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(copy)
    }

    async fn count_available(&mut self, isbn: &str, library_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM physical_copies WHERE isbn = $1 AND library_id = $2 AND status = $3",
        )
        .bind(isbn)
        .bind(library_id)
        .bind(PhysicalCopyStatus::AtLibrary)
        .fetch_one(self.conn()?)
        .await?;
        Ok(count)
    }

    async fn availability_by_library(&mut self, isbn: &str) -> AppResult<Vec<LibraryAvailability>> {
        let rows = sqlx::query_as::<_, LibraryAvailability>(
            r#"
            SELECT library_id, COUNT(*) AS available
            FROM physical_copies
            WHERE isbn = $1 AND status = $2
            GROUP BY library_id
            ORDER BY library_id
            "#,
        )
        .bind(isbn)
        .bind(PhysicalCopyStatus::AtLibrary)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn count_copy_references(&mut self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM requests WHERE physical_copy_id = $1)
                 + (SELECT COUNT(*) FROM transfers WHERE physical_copy_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(self.conn()?)
        .await?;
        Ok(count)
    }

    async fn delete_copy(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM physical_copies WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
