//! Punishment persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::postgres::PgTx;
use crate::{
    error::AppResult,
    models::{enums::PunishmentLevel, punishment::Punishment},
};

#[async_trait]
pub trait PunishmentStore: Send {
    /// Insert the punishment of a request; none when the request already has one
    async fn insert_punishment(
        &mut self,
        request_id: i32,
        reason: &str,
        level: PunishmentLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Punishment>>;

    async fn get_punishment(&mut self, id: i32) -> AppResult<Option<Punishment>>;

    async fn get_punishment_by_request(&mut self, request_id: i32) -> AppResult<Option<Punishment>>;

    async fn update_punishment_level(
        &mut self,
        id: i32,
        level: PunishmentLevel,
    ) -> AppResult<Option<Punishment>>;

    async fn delete_punishment_by_request(&mut self, request_id: i32) -> AppResult<u64>;

    /// Punishments attached to any request of the user
    async fn list_punishments_by_user(&mut self, user_id: i32) -> AppResult<Vec<Punishment>>;
}

#[async_trait]
impl PunishmentStore for PgTx {
    async fn insert_punishment(
        &mut self,
        request_id: i32,
        reason: &str,
        level: PunishmentLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Punishment>> {
        let row = sqlx::query_as::<_, Punishment>(
            r#"
            INSERT INTO punishments (request_id, reason, level, emitted_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (request_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(reason)
        .bind(level)
        .bind(now)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn get_punishment(&mut self, id: i32) -> AppResult<Option<Punishment>> {
        let row = sqlx::query_as::<_, Punishment>("SELECT * FROM punishments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(row)
    }

    async fn get_punishment_by_request(&mut self, request_id: i32) -> AppResult<Option<Punishment>> {
        let row =
            sqlx::query_as::<_, Punishment>("SELECT * FROM punishments WHERE request_id = $1")
                .bind(request_id)
                .fetch_optional(self.conn()?)
                .await?;
        Ok(row)
    }

    async fn update_punishment_level(
        &mut self,
        id: i32,
        level: PunishmentLevel,
    ) -> AppResult<Option<Punishment>> {
        let row = sqlx::query_as::<_, Punishment>(
            "UPDATE punishments SET level = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(level)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(row)
    }

    async fn delete_punishment_by_request(&mut self, request_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM punishments WHERE request_id = $1")
            .bind(request_id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_punishments_by_user(&mut self, user_id: i32) -> AppResult<Vec<Punishment>> {
        let rows = sqlx::query_as::<_, Punishment>(
            r#"
            SELECT p.* FROM punishments p
            JOIN requests r ON r.id = p.request_id
            WHERE r.user_id = $1
            ORDER BY p.emitted_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }
}
