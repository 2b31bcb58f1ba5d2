//! Physical copy registry

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        enums::PhysicalCopyStatus,
        physical_copy::{CreatePhysicalCopy, LibraryAvailability, PhysicalCopy},
    },
    repository::{Repository, StoreTx},
};

#[derive(Clone)]
pub struct CopyRegistry {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CopyRegistry {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a new copy at a library; it starts AtLibrary
    pub async fn register(&self, data: CreatePhysicalCopy) -> AppResult<PhysicalCopy> {
        data.validate()?;

        let mut tx = self.repository.begin().await?;
        let copy = tx
            .insert_copy(&data.isbn, data.library_id, self.clock.now())
            .await?;
        tx.commit().await?;

        tracing::info!(
            "Physical copy {} of {} registered at library {}",
            copy.id,
            copy.isbn,
            copy.library_id
        );
        Ok(copy)
    }

    pub async fn get(&self, id: i32) -> AppResult<PhysicalCopy> {
        let mut tx = self.repository.begin().await?;
        require_copy(tx.as_mut(), id).await
    }

    pub async fn list_by_library(&self, library_id: i32) -> AppResult<Vec<PhysicalCopy>> {
        let mut tx = self.repository.begin().await?;
        tx.list_copies_by_library(library_id).await
    }

    /// One AtLibrary copy of the title at the library, if any
    pub async fn find_available_copy(
        &self,
        isbn: &str,
        library_id: i32,
    ) -> AppResult<Option<PhysicalCopy>> {
        let mut tx = self.repository.begin().await?;
        let copy = tx.find_available_copy(isbn, library_id).await?;
        tracing::debug!(
            "Available copy of {} at library {}: {:?}",
            isbn,
            library_id,
            copy.as_ref().map(|c| c.id)
        );
        Ok(copy)
    }

    /// Unconditional status change; callers own the invariants
    pub async fn set_status(&self, id: i32, status: PhysicalCopyStatus) -> AppResult<PhysicalCopy> {
        let mut tx = self.repository.begin().await?;
        let copy = tx
            .set_copy_status(id, status)
            .await?
            .ok_or_else(|| copy_not_found(id))?;
        tx.commit().await?;

        tracing::info!("Physical copy {} set to {}", id, status);
        Ok(copy)
    }

    pub async fn count_available(&self, isbn: &str, library_id: i32) -> AppResult<i64> {
        let mut tx = self.repository.begin().await?;
        tx.count_available(isbn, library_id).await
    }

    /// AtLibrary copies of a title grouped by library
    pub async fn availability(&self, isbn: &str) -> AppResult<Vec<LibraryAvailability>> {
        let mut tx = self.repository.begin().await?;
        tx.availability_by_library(isbn).await
    }

    /// Staff-confirmed arrival of a copy at `library_id`; it becomes AtLibrary there
    ///
    /// The arrival is not required to match an accepted transfer. A mismatch is
    /// logged so it can be audited.
    pub async fn receive_copy(&self, id: i32, library_id: i32) -> AppResult<PhysicalCopy> {
        let mut tx = self.repository.begin().await?;
        let copy = require_copy(tx.as_mut(), id).await?;

        if copy.status != PhysicalCopyStatus::InTransfer {
            tracing::warn!(
                "Physical copy {} received at library {} while {}",
                id,
                library_id,
                copy.status
            );
        } else if !tx.has_accepted_transfer_to(id, library_id).await? {
            tracing::warn!(
                "Physical copy {} received at library {} without an accepted transfer to it",
                id,
                library_id
            );
        }

        let copy = tx
            .set_copy_location(id, library_id, PhysicalCopyStatus::AtLibrary)
            .await?
            .ok_or_else(|| copy_not_found(id))?;
        tx.commit().await?;

        tracing::info!("Physical copy {} now at library {}", id, library_id);
        Ok(copy)
    }

    /// Delete a copy that is AtLibrary and referenced by no request or transfer
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.begin().await?;
        let copy = require_copy(tx.as_mut(), id).await?;

        if copy.status != PhysicalCopyStatus::AtLibrary {
            return Err(AppError::InvalidCopyState {
                copy_id: id,
                status: copy.status.to_string(),
            });
        }

        let references = tx.count_copy_references(id).await?;
        if references > 0 {
            return Err(AppError::DependentRecordsExist(format!(
                "Physical copy {} is referenced by {} requests or transfers",
                id, references
            )));
        }

        tx.delete_copy(id).await?;
        tx.commit().await?;

        tracing::info!("Physical copy {} deleted", id);
        Ok(())
    }
}

fn copy_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Physical copy with id {} not found", id))
}

/// Load a copy inside an open transaction
pub(crate) async fn require_copy(tx: &mut dyn StoreTx, id: i32) -> AppResult<PhysicalCopy> {
    tx.get_copy(id).await?.ok_or_else(|| copy_not_found(id))
}
