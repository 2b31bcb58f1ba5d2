//! Notification emission, live delivery and queries

use std::sync::Arc;
use tokio::sync::broadcast;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::notification::{CreateBroadcast, Notification, NotificationEvent},
    repository::{Repository, StoreTx},
};

/// Receives every notification event once its transaction has committed
///
/// Emission is fire-and-forget: it cannot fail nor block the caller.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: &NotificationEvent);
}

/// Sink that only logs events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, event: &NotificationEvent) {
        tracing::info!("Notification emitted: {:?}", event);
    }
}

/// Sink that fans events out to live subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<NotificationEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn emit(&self, event: &NotificationEvent) {
        // Sending fails only when nobody listens
        match self.sender.send(event.clone()) {
            Ok(receivers) => tracing::debug!("Notification delivered to {} subscribers", receivers),
            Err(_) => tracing::debug!("Notification emitted with no live subscriber"),
        }
    }
}

/// Turns trigger events into persisted notifications and live deliveries
#[derive(Clone)]
pub struct NotificationIssuer {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationIssuer {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { clock, sink }
    }

    /// Persist the notification inside the triggering transaction
    pub async fn record(
        &self,
        tx: &mut dyn StoreTx,
        event: &NotificationEvent,
    ) -> AppResult<Notification> {
        let row = event.to_new_notification(self.clock.now());
        tx.insert_notification(&row).await
    }

    /// Hand committed events to the sink
    pub fn publish(&self, events: &[NotificationEvent]) {
        for event in events {
            self.sink.emit(event);
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    issuer: NotificationIssuer,
}

impl NotificationService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, issuer: NotificationIssuer) -> Self {
        Self {
            repository,
            clock,
            issuer,
        }
    }

    /// Send a manual notification to every user
    pub async fn broadcast(&self, data: CreateBroadcast) -> AppResult<Notification> {
        data.validate()?;

        let event = NotificationEvent::Broadcast {
            title: data.title,
            description: data.description,
            end_date: data.end_date,
        };

        let mut tx = self.repository.begin().await?;
        let notification = self.issuer.record(tx.as_mut(), &event).await?;
        tx.commit().await?;

        tracing::info!("Broadcast notification {} created", notification.id);
        self.issuer.publish(&[event]);
        Ok(notification)
    }

    /// Unexpired notifications for a user, broadcasts included
    pub async fn active_for_user(&self, user_id: i32) -> AppResult<Vec<Notification>> {
        let mut tx = self.repository.begin().await?;
        tx.list_active_for_user(user_id, self.clock.now()).await
    }

    /// Unexpired notifications for a library
    pub async fn active_for_library(&self, library_id: i32) -> AppResult<Vec<Notification>> {
        let mut tx = self.repository.begin().await?;
        tx.list_active_for_library(library_id, self.clock.now()).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.begin().await?;
        if !tx.delete_notification(id).await? {
            return Err(AppError::NotFound(format!(
                "Notification with id {} not found",
                id
            )));
        }
        tx.commit().await?;
        tracing::info!("Notification {} deleted", id);
        Ok(())
    }
}
