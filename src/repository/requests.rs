//! Borrow request persistence

use async_trait::async_trait;

use super::postgres::PgTx;
use crate::{
    error::AppResult,
    models::{
        enums::RequestStatus,
        request::{BorrowRequest, NewRequest},
    },
};

/// Namespace of the per-user advisory locks taken while creating requests
const REQUEST_LOCK_NAMESPACE: i32 = 1;

#[async_trait]
pub trait RequestStore: Send {
    /// Serialize request creation for one user until the transaction ends
    async fn lock_user_requests(&mut self, user_id: i32) -> AppResult<()>;

    async fn insert_request(&mut self, request: &NewRequest) -> AppResult<BorrowRequest>;

    async fn get_request(&mut self, id: i32) -> AppResult<Option<BorrowRequest>>;

    /// Write back status, assigned copy and end date
    async fn update_request(&mut self, request: &BorrowRequest) -> AppResult<()>;

    async fn delete_request(&mut self, id: i32) -> AppResult<bool>;

    /// Requests of the user whose status is neither Canceled nor Returned
    async fn count_active_requests(&mut self, user_id: i32) -> AppResult<i64>;

    async fn has_active_request(&mut self, user_id: i32, isbn: &str) -> AppResult<bool>;

    async fn list_requests_by_user(&mut self, user_id: i32) -> AppResult<Vec<BorrowRequest>>;

    /// Waiting requests for a title at a library, oldest first
    async fn list_waiting(&mut self, isbn: &str, library_id: i32) -> AppResult<Vec<BorrowRequest>>;
}

#[async_trait]
impl RequestStore for PgTx {
    async fn lock_user_requests(&mut self, user_id: i32) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(REQUEST_LOCK_NAMESPACE)
            .bind(user_id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn insert_request(&mut self, request: &NewRequest) -> AppResult<BorrowRequest> {
        let row = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO requests (user_id, isbn, library_id, physical_copy_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.isbn)
        .bind(request.library_id)
        .bind(request.physical_copy_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.status)
        .fetch_one(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn get_request(&mut self, id: i32) -> AppResult<Option<BorrowRequest>> {
        let row = sqlx::query_as::<_, BorrowRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(row)
    }

    async fn update_request(&mut self, request: &BorrowRequest) -> AppResult<()> {
        sqlx::query(
            "UPDATE requests SET status = $2, physical_copy_id = $3, end_date = $4 WHERE id = $1",
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.physical_copy_id)
        .bind(request.end_date)
        .execute(self.conn()?)
        .await?;
        Ok(())
    }

    async fn delete_request(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_active_requests(&mut self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests WHERE user_id = $1 AND status = ANY($2)",
        )
        .bind(user_id)
        .bind(RequestStatus::active_discriminants().to_vec())
        .fetch_one(self.conn()?)
        .await?;
        Ok(count)
    }

    async fn has_active_request(&mut self, user_id: i32, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM requests WHERE user_id = $1 AND isbn = $2 AND status = ANY($3))",
        )
        .bind(user_id)
        .bind(isbn)
        .bind(RequestStatus::active_discriminants().to_vec())
        .fetch_one(self.conn()?)
        .await?;
        Ok(exists)
    }

    async fn list_requests_by_user(&mut self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM requests WHERE user_id = $1 ORDER BY start_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn list_waiting(&mut self, isbn: &str, library_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(
            r#"
            SELECT * FROM requests
            WHERE isbn = $1 AND library_id = $2 AND status = $3
            ORDER BY start_date, id
            "#,
        )
        .bind(isbn)
        .bind(library_id)
        .bind(RequestStatus::Waiting)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }
}
