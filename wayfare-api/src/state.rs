use std::sync::Arc;

use wayfare_booking::BookingIntake;
use wayfare_core::repository::{BookingRepository, ParticipantRepository, TripRepository};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<BookingIntake>,
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub metrics: Arc<Metrics>,
}
