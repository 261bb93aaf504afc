use std::sync::Arc;

use uuid::Uuid;
use wayfare_core::repository::TripRepository;
use wayfare_shared::models::Trip;

use crate::intake::IntakeError;

/// Gate in front of the trip seat counters. Looks the trip up, fast-fails on
/// obviously unavailable capacity and then defers to the atomic datastore
/// primitive for the authoritative check-and-increment.
pub struct SeatReservationGuard {
    trips: Arc<dyn TripRepository>,
}

impl SeatReservationGuard {
    pub fn new(trips: Arc<dyn TripRepository>) -> Self {
        Self { trips }
    }

    pub async fn reserve(&self, slug: &str, seats: i32) -> Result<SeatReservation, IntakeError> {
        let trip = self
            .trips
            .find_active_by_slug(slug)
            .await
            .map_err(IntakeError::Store)?
            .ok_or(IntakeError::TripNotFound)?;

        // Advisory fast-fail; the reserve primitive re-checks atomically.
        if seats > trip.seats_available() {
            return Err(IntakeError::NotEnoughSeats);
        }

        let reserved = self
            .trips
            .reserve_seats(trip.id, seats)
            .await
            .map_err(IntakeError::Store)?;
        if !reserved {
            // Lost the race to a concurrent booking; same outcome for the caller.
            return Err(IntakeError::NotEnoughSeats);
        }

        tracing::debug!(trip_id = %trip.id, seats, "seats reserved");
        Ok(SeatReservation {
            trips: Arc::clone(&self.trips),
            trip,
            seats,
            released: false,
        })
    }
}

/// A successful reservation, carrying the trip and everything needed for the
/// compensating release. Tracks whether release already fired so rollback
/// paths can call it without double-counting.
pub struct SeatReservation {
    trips: Arc<dyn TripRepository>,
    pub trip: Trip,
    pub seats: i32,
    released: bool,
}

impl SeatReservation {
    pub fn trip_id(&self) -> Uuid {
        self.trip.id
    }

    /// Return the seats to the pool. Safe to call more than once; only the
    /// first call reaches the datastore. A failed release is logged, not
    /// propagated: the caller is already on an error path.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(error) = self.trips.release_seats(self.trip.id, self.seats).await {
            tracing::error!(
                trip_id = %self.trip.id,
                seats = self.seats,
                %error,
                "failed to release reserved seats"
            );
        }
    }
}
