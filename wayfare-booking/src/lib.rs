pub mod fulfillment;
pub mod intake;
pub mod memory;
pub mod participants;
pub mod reference;
pub mod reservation;
pub mod validate;
pub mod writer;

pub use fulfillment::{FulfillmentConfig, FulfillmentOrchestrator, FulfillmentOutcome};
pub use intake::{BookingIntake, BookingReceipt, IntakeDependencies, IntakeError};
pub use reservation::{SeatReservation, SeatReservationGuard};
pub use validate::{validate_request, BookingRequest, ParticipantPayload};
pub use writer::BookingWriter;
