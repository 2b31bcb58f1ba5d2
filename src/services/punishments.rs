//! Punishments for borrow requests

use std::sync::Arc;
use validator::Validate;

use super::{notifications::NotificationIssuer, requests::require_request};
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        enums::PunishmentLevel,
        notification::NotificationEvent,
        punishment::{IssuePunishment, Punishment},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PunishmentService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    issuer: NotificationIssuer,
}

impl PunishmentService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, issuer: NotificationIssuer) -> Self {
        Self {
            repository,
            clock,
            issuer,
        }
    }

    /// Issue a level one punishment for a request; one per request at most
    pub async fn issue(&self, data: IssuePunishment) -> AppResult<Punishment> {
        data.validate()?;

        let mut tx = self.repository.begin().await?;
        let request = require_request(tx.as_mut(), data.request_id).await?;

        // Conflicting inserts resolve to none, concurrent issuers included
        let punishment = tx
            .insert_punishment(
                request.id,
                &data.reason,
                PunishmentLevel::One,
                self.clock.now(),
            )
            .await?
            .ok_or(AppError::DuplicatePunishment(request.id))?;

        let event = NotificationEvent::PunishmentIssued {
            user_id: request.user_id,
            request_id: request.id,
            reason: punishment.reason.clone(),
        };
        self.issuer.record(tx.as_mut(), &event).await?;
        tx.commit().await?;

        tracing::info!(
            "Punishment {} issued for request {} of user {}",
            punishment.id,
            request.id,
            request.user_id
        );
        self.issuer.publish(&[event]);
        Ok(punishment)
    }

    pub async fn update_level(&self, id: i32, level: PunishmentLevel) -> AppResult<Punishment> {
        let mut tx = self.repository.begin().await?;
        let punishment = tx
            .update_punishment_level(id, level)
            .await?
            .ok_or_else(|| punishment_not_found(id))?;
        tx.commit().await?;

        tracing::info!("Punishment {} set to level {}", id, level);
        Ok(punishment)
    }

    pub async fn get(&self, id: i32) -> AppResult<Punishment> {
        let mut tx = self.repository.begin().await?;
        tx.get_punishment(id)
            .await?
            .ok_or_else(|| punishment_not_found(id))
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Punishment>> {
        let mut tx = self.repository.begin().await?;
        tx.list_punishments_by_user(user_id).await
    }
}

fn punishment_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Punishment with id {} not found", id))
}
