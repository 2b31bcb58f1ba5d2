//! Repository layer: the persistence interface of the circulation engine
//!
//! Every business transition opens one [`StoreTx`] from a [`Store`], performs
//! its reads and writes through the per-entity traits, and commits. Dropping a
//! transaction without committing discards its writes.

pub mod copies;
pub mod memory;
pub mod notifications;
pub mod postgres;
pub mod punishments;
pub mod requests;
pub mod transfers;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AppResult;

pub use copies::CopyStore;
pub use memory::MemoryStore;
pub use notifications::NotificationStore;
pub use postgres::PgStore;
pub use punishments::PunishmentStore;
pub use requests::RequestStore;
pub use transfers::TransferStore;

/// Entry point of a storage backend
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;

    /// Check the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// One unit of work over every circulation entity
#[async_trait]
pub trait StoreTx:
    CopyStore + RequestStore + TransferStore + PunishmentStore + NotificationStore + Send
{
    /// Make every write of this transaction visible
    async fn commit(&mut self) -> AppResult<()>;
}

/// Shared handle on the configured backend
pub type Repository = Arc<dyn Store>;
