pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod mailer;
pub mod payment_client;
pub mod pdf_client;
pub mod trip_repo;

pub use app_config::Config;
pub use booking_repo::{
    StoreAgreementRepository, StoreBookingRepository, StoreParticipantRepository,
};
pub use database::DbClient;
pub use mailer::SmtpMailer;
pub use payment_client::HttpPaymentProvider;
pub use pdf_client::HttpAgreementRenderer;
pub use trip_repo::StoreTripRepository;
