//! Transfers of physical copies between libraries

use std::sync::Arc;

use super::{copies::require_copy, notifications::NotificationIssuer};
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    lifecycle::{ensure_transfer_deletable, next_transfer_status, TransferEvent},
    models::{
        enums::PhysicalCopyStatus,
        notification::NotificationEvent,
        transfer::{CreateTransfer, NewTransfer, Transfer},
    },
    repository::{Repository, StoreTx},
};

#[derive(Clone)]
pub struct TransferService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    issuer: NotificationIssuer,
}

impl TransferService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, issuer: NotificationIssuer) -> Self {
        Self {
            repository,
            clock,
            issuer,
        }
    }

    /// Ask for a copy sitting at the source library to be sent to the destination
    pub async fn create(&self, data: CreateTransfer) -> AppResult<Transfer> {
        if data.source_library_id == data.destination_library_id {
            return Err(AppError::Validation(
                "Source and destination libraries must differ".to_string(),
            ));
        }

        let mut tx = self.repository.begin().await?;
        let copy = require_copy(tx.as_mut(), data.physical_copy_id).await?;

        if copy.status != PhysicalCopyStatus::AtLibrary {
            return Err(AppError::InvalidCopyState {
                copy_id: copy.id,
                status: copy.status.to_string(),
            });
        }
        if copy.library_id != data.source_library_id {
            return Err(AppError::WrongSourceLibrary {
                copy_id: copy.id,
                library_id: data.source_library_id,
            });
        }

        let transfer = tx
            .insert_transfer(&NewTransfer {
                physical_copy_id: data.physical_copy_id,
                source_library_id: data.source_library_id,
                destination_library_id: data.destination_library_id,
                start_date: self.clock.now(),
            })
            .await?;

        let event = NotificationEvent::TransferRequested {
            source_library_id: transfer.source_library_id,
            transfer_id: transfer.id,
            physical_copy_id: transfer.physical_copy_id,
        };
        self.issuer.record(tx.as_mut(), &event).await?;
        tx.commit().await?;

        tracing::info!(
            "Transfer {} requested: copy {} from library {} to library {}",
            transfer.id,
            transfer.physical_copy_id,
            transfer.source_library_id,
            transfer.destination_library_id
        );
        self.issuer.publish(&[event]);
        Ok(transfer)
    }

    /// Accept a pending transfer; the copy goes InTransfer but keeps its location
    /// until its arrival is confirmed
    pub async fn accept(&self, id: i32) -> AppResult<Transfer> {
        let mut tx = self.repository.begin().await?;
        let mut transfer = require_transfer(tx.as_mut(), id).await?;
        let next = next_transfer_status(transfer.status, TransferEvent::Accept)?;

        let moved = tx
            .compare_and_set_copy_status(
                transfer.physical_copy_id,
                PhysicalCopyStatus::AtLibrary,
                PhysicalCopyStatus::InTransfer,
            )
            .await?;
        if moved.is_none() {
            let copy = require_copy(tx.as_mut(), transfer.physical_copy_id).await?;
            return Err(AppError::InvalidCopyState {
                copy_id: copy.id,
                status: copy.status.to_string(),
            });
        }

        transfer.status = next;
        transfer.end_date = Some(self.clock.now());
        tx.update_transfer(&transfer).await?;

        let event = NotificationEvent::TransferArriving {
            destination_library_id: transfer.destination_library_id,
            transfer_id: transfer.id,
            physical_copy_id: transfer.physical_copy_id,
        };
        self.issuer.record(tx.as_mut(), &event).await?;
        tx.commit().await?;

        tracing::info!(
            "Transfer {} accepted, copy {} in transfer",
            id,
            transfer.physical_copy_id
        );
        self.issuer.publish(&[event]);
        Ok(transfer)
    }

    pub async fn reject(&self, id: i32) -> AppResult<Transfer> {
        self.close(id, TransferEvent::Reject).await
    }

    pub async fn cancel(&self, id: i32) -> AppResult<Transfer> {
        self.close(id, TransferEvent::Cancel).await
    }

    /// Delete a transfer that has left Pending
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.begin().await?;
        let transfer = require_transfer(tx.as_mut(), id).await?;

        ensure_transfer_deletable(transfer.status)?;

        tx.delete_transfer(id).await?;
        tx.commit().await?;

        tracing::info!("Transfer {} deleted", id);
        Ok(())
    }

    pub async fn get(&self, id: i32) -> AppResult<Transfer> {
        let mut tx = self.repository.begin().await?;
        require_transfer(tx.as_mut(), id).await
    }

    /// Transfers leaving or reaching a library
    pub async fn list_by_library(&self, library_id: i32) -> AppResult<Vec<Transfer>> {
        let mut tx = self.repository.begin().await?;
        tx.list_transfers_by_library(library_id).await
    }

    /// Reject or cancel; the copy is left untouched
    async fn close(&self, id: i32, event: TransferEvent) -> AppResult<Transfer> {
        let mut tx = self.repository.begin().await?;
        let mut transfer = require_transfer(tx.as_mut(), id).await?;

        transfer.status = next_transfer_status(transfer.status, event)?;
        transfer.end_date = Some(self.clock.now());
        tx.update_transfer(&transfer).await?;
        tx.commit().await?;

        tracing::info!("Transfer {} {}", id, transfer.status);
        Ok(transfer)
    }
}

async fn require_transfer(tx: &mut dyn StoreTx, id: i32) -> AppResult<Transfer> {
    tx.get_transfer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer with id {} not found", id)))
}
