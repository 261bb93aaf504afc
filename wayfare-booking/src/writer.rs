use std::sync::Arc;

use uuid::Uuid;
use wayfare_core::repository::{BookingRepository, BoxError, CreatedBooking, NewBooking};

/// Persists booking rows through an ordered pair of strategies sharing one
/// postcondition: a durable row with id and reference.
///
/// The primary strategy is the datastore's `create_booking` procedure, which
/// writes every field in a single step. When the procedure errors or returns
/// no row, the writer falls back to a direct insert of the guaranteed-stable
/// columns followed by a best-effort patch of the optional ones. A failed
/// patch leaves the booking valid with some contact fields missing; that is
/// accepted looseness, not an error.
pub struct BookingWriter {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingWriter {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn create(&self, booking: &NewBooking) -> Result<CreatedBooking, BoxError> {
        match self.bookings.create_via_procedure(booking).await {
            Ok(Some(created)) => return Ok(created),
            Ok(None) => {
                tracing::warn!(
                    booking_ref = %booking.booking_ref,
                    "create_booking procedure returned no row, using direct insert"
                );
            }
            Err(error) => {
                tracing::warn!(
                    booking_ref = %booking.booking_ref,
                    %error,
                    "create_booking procedure failed, using direct insert"
                );
            }
        }

        let created = self.bookings.insert_minimal(booking).await?;

        // Best-effort enrichment of the optional columns; the row already
        // satisfies the postcondition.
        if let Err(error) = self.bookings.patch_details(created.id, booking).await {
            tracing::warn!(
                booking_id = %created.id,
                %error,
                "could not patch optional booking fields"
            );
        }

        Ok(created)
    }

    /// Read back the datastore-minted access token through the privileged
    /// path. Degrades to None; the caller then builds the fallback customer
    /// URL instead.
    pub async fn access_token(&self, booking_id: Uuid) -> Option<String> {
        match self.bookings.fetch_access_token(booking_id).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%booking_id, %error, "could not fetch booking access token");
                None
            }
        }
    }

    /// Tear down a booking whose participants failed to persist. Errors are
    /// logged only: the caller is already unwinding.
    pub async fn discard(&self, booking_id: Uuid) {
        if let Err(error) = self.bookings.delete(booking_id).await {
            tracing::error!(%booking_id, %error, "could not delete rolled-back booking");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{sample_new_booking, MemoryBookingRepository};

    #[tokio::test]
    async fn test_primary_path_creates_booking() {
        let repo = Arc::new(MemoryBookingRepository::new());
        let writer = BookingWriter::new(repo.clone());

        let created = writer.create(&sample_new_booking("WF-TEST-0001")).await.unwrap();
        assert_eq!(created.booking_ref, "WF-TEST-0001");
        assert_eq!(repo.procedure_calls(), 1);
        assert_eq!(repo.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_procedure_failure_falls_back_to_insert() {
        let repo = Arc::new(MemoryBookingRepository::new());
        repo.fail_procedure();
        let writer = BookingWriter::new(repo.clone());

        let created = writer.create(&sample_new_booking("WF-TEST-0002")).await.unwrap();
        assert_eq!(created.booking_ref, "WF-TEST-0002");
        assert_eq!(repo.insert_calls(), 1);
        assert_eq!(repo.patch_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_procedure_result_falls_back_to_insert() {
        let repo = Arc::new(MemoryBookingRepository::new());
        repo.procedure_unavailable();
        let writer = BookingWriter::new(repo.clone());

        assert!(writer.create(&sample_new_booking("WF-TEST-0003")).await.is_ok());
        assert_eq!(repo.insert_calls(), 1);
    }

    #[tokio::test]
    async fn test_patch_failure_does_not_fail_booking() {
        let repo = Arc::new(MemoryBookingRepository::new());
        repo.fail_procedure();
        repo.fail_patch();
        let writer = BookingWriter::new(repo.clone());

        let created = writer.create(&sample_new_booking("WF-TEST-0004")).await.unwrap();
        assert!(repo.find(created.id).is_some());
    }

    #[tokio::test]
    async fn test_access_token_degrades_to_none() {
        let repo = Arc::new(MemoryBookingRepository::new());
        repo.fail_token_read();
        let writer = BookingWriter::new(repo.clone());

        let created = writer.create(&sample_new_booking("WF-TEST-0005")).await.unwrap();
        assert_eq!(writer.access_token(created.id).await, None);
    }
}
