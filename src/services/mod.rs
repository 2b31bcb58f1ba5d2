//! Business logic services

pub mod copies;
pub mod notifications;
pub mod punishments;
pub mod requests;
pub mod transfers;

use std::sync::Arc;

use crate::{clock::Clock, config::CirculationConfig, repository::Repository};

use notifications::{NotificationIssuer, NotificationSink};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub copies: copies::CopyRegistry,
    pub requests: requests::RequestService,
    pub transfers: transfers::TransferService,
    pub punishments: punishments::PunishmentService,
    pub notifications: notifications::NotificationService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(
        repository: Repository,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        policy: CirculationConfig,
    ) -> Self {
        let issuer = NotificationIssuer::new(clock.clone(), sink);

        Self {
            copies: copies::CopyRegistry::new(repository.clone(), clock.clone()),
            requests: requests::RequestService::new(
                repository.clone(),
                clock.clone(),
                issuer.clone(),
                policy,
            ),
            transfers: transfers::TransferService::new(
                repository.clone(),
                clock.clone(),
                issuer.clone(),
            ),
            punishments: punishments::PunishmentService::new(
                repository.clone(),
                clock.clone(),
                issuer.clone(),
            ),
            notifications: notifications::NotificationService::new(repository, clock, issuer),
        }
    }
}
