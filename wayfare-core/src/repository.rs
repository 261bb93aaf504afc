use async_trait::async_trait;
use uuid::Uuid;
use wayfare_shared::models::{
    Address, Agreement, AgreementStatus, Booking, BookingSource, BookingStatus, CompanyDetails,
    ConsentRecord, ContactDetails, Participant, PaymentStatus, Trip,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Booking row fields set at creation time. The access token is not part of
/// this payload: the datastore mints it and it is read back through the
/// privileged path.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub trip_id: Uuid,
    pub booking_ref: String,
    pub contact: ContactDetails,
    pub company: Option<CompanyDetails>,
    pub consents: ConsentRecord,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub source: BookingSource,
    pub notes: Option<String>,
}

/// What the datastore hands back once a booking row exists
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub id: Uuid,
    pub booking_ref: String,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub first_name: String,
    pub last_name: String,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct NewAgreement {
    pub booking_id: Uuid,
    pub status: AgreementStatus,
    pub pdf_url: Option<String>,
}

/// Repository trait for trip data access and the seat counters.
///
/// `reserve_seats` is the authoritative capacity check: a single conditional
/// read-check-increment executed by the datastore. `release_seats` is its
/// compensating action.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Look up an active trip by its slug or public-facing alias.
    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Trip>, BoxError>;

    /// Atomically reserve `count` seats. Returns false when the trip does
    /// not have that many seats left.
    async fn reserve_seats(&self, trip_id: Uuid, count: i32) -> Result<bool, BoxError>;

    /// Return `count` seats to the pool. Must never drive the counter
    /// negative.
    async fn release_seats(&self, trip_id: Uuid, count: i32) -> Result<(), BoxError>;
}

/// Repository trait for booking rows.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Primary write path: one atomic datastore procedure that persists all
    /// fields and returns the new row. `Ok(None)` means the procedure is
    /// unavailable or returned nothing, and the caller should fall back.
    async fn create_via_procedure(
        &self,
        booking: &NewBooking,
    ) -> Result<Option<CreatedBooking>, BoxError>;

    /// Fallback write path: direct insert limited to the guaranteed-stable
    /// column set.
    async fn insert_minimal(&self, booking: &NewBooking) -> Result<CreatedBooking, BoxError>;

    /// Second half of the fallback path: populate the optional columns the
    /// minimal insert skipped (name split, company fields).
    async fn patch_details(&self, id: Uuid, booking: &NewBooking) -> Result<(), BoxError>;

    /// Privileged read of the datastore-minted access token. Bypasses the
    /// row-level policy that hides the token from request-scoped access;
    /// only the booking writer uses this.
    async fn fetch_access_token(&self, id: Uuid) -> Result<Option<String>, BoxError>;

    /// Tear down a booking whose participants could not be written.
    async fn delete(&self, id: Uuid) -> Result<(), BoxError>;

    async fn find_by_ref(&self, booking_ref: &str) -> Result<Option<Booking>, BoxError>;

    /// Settlement updates driven by the payment provider's webhook.
    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus)
        -> Result<(), BoxError>;

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), BoxError>;
}

/// Repository trait for participant rows.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Insert all rows for one booking as a single batch.
    async fn insert_batch(
        &self,
        booking_id: Uuid,
        participants: &[NewParticipant],
    ) -> Result<(), BoxError>;

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Participant>, BoxError>;
}

/// Repository trait for agreement records.
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    async fn create(&self, agreement: &NewAgreement) -> Result<Agreement, BoxError>;
}
