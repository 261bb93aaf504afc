use std::sync::Arc;

use thiserror::Error;
use wayfare_core::mail::Mailer;
use wayfare_core::payment::PaymentProvider;
use wayfare_core::pdf::{AgreementRenderer, ParticipantName};
use wayfare_core::repository::{
    AgreementRepository, BookingRepository, BoxError, NewBooking, ParticipantRepository,
    TripRepository,
};
use wayfare_shared::models::{BookingSource, BookingStatus, PaymentStatus};

use crate::fulfillment::{FulfillmentContext, FulfillmentOrchestrator};
use crate::participants::ParticipantWriter;
use crate::reference;
use crate::reservation::SeatReservationGuard;
use crate::validate::BookingRequest;
use crate::writer::BookingWriter;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("trip not found")]
    TripNotFound,
    #[error("not enough seats")]
    NotEnoughSeats,
    #[error("booking storage failed: {0}")]
    Store(#[source] BoxError),
}

/// What the caller gets back on a successful booking
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking_ref: String,
    pub agreement_pdf_url: Option<String>,
    pub booking_url: String,
    pub redirect_url: Option<String>,
}

/// Sequences one booking submission: reserve seats, write the booking row,
/// write the participant batch, then run best-effort fulfillment.
///
/// Rollback discipline: a booking-write failure releases the seats; a
/// participant-write failure deletes the booking and releases the seats.
/// Nothing after that point can fail the request.
pub struct BookingIntake {
    guard: SeatReservationGuard,
    writer: BookingWriter,
    participants: ParticipantWriter,
    fulfillment: FulfillmentOrchestrator,
}

impl BookingIntake {
    pub fn new(
        guard: SeatReservationGuard,
        writer: BookingWriter,
        participants: ParticipantWriter,
        fulfillment: FulfillmentOrchestrator,
    ) -> Self {
        Self {
            guard,
            writer,
            participants,
            fulfillment,
        }
    }

    /// Submit a validated booking request. Callers run `validate_request`
    /// first; this method performs no input validation of its own.
    pub async fn submit(
        &self,
        request: BookingRequest,
        source: BookingSource,
    ) -> Result<BookingReceipt, IntakeError> {
        let seats = request.participants.len() as i32;
        let mut reservation = self.guard.reserve(&request.slug, seats).await?;

        let booking_ref = reference::generate_booking_ref();
        let new_booking = NewBooking {
            trip_id: reservation.trip_id(),
            booking_ref: booking_ref.clone(),
            contact: request.contact_details(),
            company: request.company_details(),
            consents: request.consent_record(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            source,
            notes: None,
        };

        let created = match self.writer.create(&new_booking).await {
            Ok(created) => created,
            Err(error) => {
                tracing::error!(%booking_ref, %error, "booking write failed, releasing seats");
                reservation.release().await;
                return Err(IntakeError::Store(error));
            }
        };

        let rows = ParticipantWriter::rows(&new_booking.contact.address, &request.participants);
        if let Err(error) = self.participants.insert(created.id, &rows).await {
            tracing::error!(
                booking_id = %created.id,
                %error,
                "participant write failed, rolling back booking"
            );
            self.writer.discard(created.id).await;
            reservation.release().await;
            return Err(IntakeError::Store(error));
        }

        let access_token = self.writer.access_token(created.id).await;
        let ctx = FulfillmentContext {
            booking_id: created.id,
            booking_ref: created.booking_ref.clone(),
            trip: reservation.trip.clone(),
            contact: new_booking.contact.clone(),
            company: new_booking.company.clone(),
            participants: rows
                .iter()
                .map(|row| ParticipantName {
                    first_name: row.first_name.clone(),
                    last_name: row.last_name.clone(),
                })
                .collect(),
            access_token,
            with_payment: request.with_payment,
        };
        let outcome = self.fulfillment.run(&ctx).await;

        tracing::info!(
            booking_ref = %created.booking_ref,
            trip_id = %reservation.trip_id(),
            seats,
            "booking created"
        );

        Ok(BookingReceipt {
            booking_ref: created.booking_ref,
            agreement_pdf_url: outcome.agreement_pdf_url,
            booking_url: outcome.booking_url,
            redirect_url: outcome.redirect_url,
        })
    }
}

/// Wiring helper used by the API and the tests: builds an intake pipeline
/// from trait objects.
pub struct IntakeDependencies {
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub agreements: Arc<dyn AgreementRepository>,
    pub renderer: Arc<dyn AgreementRenderer>,
    pub mailer: Arc<dyn Mailer>,
    pub payments: Arc<dyn PaymentProvider>,
    pub config: crate::fulfillment::FulfillmentConfig,
}

impl BookingIntake {
    pub fn from_dependencies(deps: IntakeDependencies) -> Self {
        Self::new(
            SeatReservationGuard::new(deps.trips),
            BookingWriter::new(deps.bookings),
            ParticipantWriter::new(deps.participants),
            FulfillmentOrchestrator::new(
                deps.renderer,
                deps.mailer,
                deps.payments,
                deps.agreements,
                deps.config,
            ),
        )
    }
}
