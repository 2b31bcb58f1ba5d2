//! Library circulation engine
//!
//! Tracks the physical copies of a multi-library network, the borrow requests
//! made against them, transfers of copies between libraries, punishments for
//! misbehaving borrowers and the notifications these events produce. Exposed
//! as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
    /// Live feed of committed notification events
    pub live: services::notifications::BroadcastSink,
}

impl AppState {
    /// Wire the services over a store, delivering notifications to `live`
    pub fn new(
        config: AppConfig,
        repository: repository::Repository,
        clock: Arc<dyn clock::Clock>,
    ) -> Self {
        let live = services::notifications::BroadcastSink::new(
            config.circulation.notification_channel_capacity,
        );
        let services = services::Services::new(
            repository.clone(),
            clock,
            Arc::new(live.clone()),
            config.circulation.clone(),
        );

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            repository,
            live,
        }
    }
}
