pub mod mail;
pub mod pdf;
pub mod payment;
pub mod repository;

pub use mail::{EmailAttachment, EmailMessage, Mailer};
pub use payment::{PaymentProvider, PaymentSession, PaymentSessionRequest};
pub use pdf::{AgreementData, AgreementRenderer, ParticipantName, RenderedDocument};
pub use repository::{
    AgreementRepository, BookingRepository, BoxError, CreatedBooking, NewAgreement, NewBooking,
    NewParticipant, ParticipantRepository, TripRepository,
};
