//! Notification persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::postgres::PgTx;
use crate::{
    error::AppResult,
    models::notification::{NewNotification, Notification},
};

#[async_trait]
pub trait NotificationStore: Send {
    async fn insert_notification(&mut self, notification: &NewNotification) -> AppResult<Notification>;

    async fn delete_notification(&mut self, id: i32) -> AppResult<bool>;

    async fn delete_notifications_by_request(&mut self, request_id: i32) -> AppResult<u64>;

    /// Unexpired notifications addressed to the user, plus broadcasts
    async fn list_active_for_user(
        &mut self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>>;

    /// Unexpired notifications addressed to the library
    async fn list_active_for_library(
        &mut self,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>>;
}

#[async_trait]
impl NotificationStore for PgTx {
    async fn insert_notification(&mut self, notification: &NewNotification) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (title, description, emitted_date, end_date, for_all, user_id, request_id, library_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&notification.title)
        .bind(&notification.description)
        .bind(notification.emitted_date)
        .bind(notification.end_date)
        .bind(notification.for_all)
        .bind(notification.user_id)
        .bind(notification.request_id)
        .bind(notification.library_id)
        .fetch_one(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn delete_notification(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_notifications_by_request(&mut self, request_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE request_id = $1")
            .bind(request_id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_active_for_user(
        &mut self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE (user_id = $1 OR for_all)
              AND (end_date IS NULL OR end_date >= $2)
            ORDER BY emitted_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn list_active_for_library(
        &mut self,
        library_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE library_id = $1
              AND (end_date IS NULL OR end_date >= $2)
            ORDER BY emitted_date DESC, id DESC
            "#,
        )
        .bind(library_id)
        .bind(now)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }
}
