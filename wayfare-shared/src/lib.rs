pub mod models;
pub mod pii;

pub use models::{
    Address, Agreement, AgreementStatus, Booking, BookingSource, BookingStatus, CompanyDetails,
    ConsentRecord, ContactDetails, Participant, PaymentStatus, Trip,
};
pub use pii::Masked;
