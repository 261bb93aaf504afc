//! In-memory implementations of the repository and collaborator traits.
//!
//! These back the test suite across the workspace and double as a reference
//! for the contract each trait implementation must honor, most importantly
//! the atomic check-and-increment semantics of seat reservation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use wayfare_core::mail::{EmailMessage, Mailer};
use wayfare_core::payment::{PaymentProvider, PaymentSession, PaymentSessionRequest};
use wayfare_core::pdf::{AgreementData, AgreementRenderer, RenderedDocument};
use wayfare_core::repository::{
    AgreementRepository, BookingRepository, BoxError, CreatedBooking, NewAgreement, NewBooking,
    NewParticipant, ParticipantRepository, TripRepository,
};
use wayfare_shared::models::{
    Address, Agreement, Booking, BookingSource, BookingStatus, ConsentRecord, ContactDetails,
    Participant, PaymentStatus, Trip,
};

use crate::reference::generate_access_token;

pub fn sample_trip(slug: &str, seats_total: i32, seats_reserved: i32) -> Trip {
    let now = Utc::now();
    Trip {
        id: Uuid::new_v4(),
        title: "Dolomites Weekend".to_string(),
        slug: slug.to_string(),
        public_slug: None,
        starts_on: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        ends_on: NaiveDate::from_ymd_opt(2026, 9, 6).unwrap(),
        price_per_seat: 149_900,
        currency: "PLN".to_string(),
        seats_total,
        seats_reserved,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_contact() -> ContactDetails {
    ContactDetails {
        first_name: Some("Anna".to_string()),
        last_name: Some("Kowalska".to_string()),
        email: "anna@example.com".to_string().into(),
        phone: "+48600700800".to_string().into(),
        address: Address {
            street: "Polna 12".to_string(),
            city: "Warszawa".to_string(),
            zip: "00-625".to_string(),
        },
    }
}

pub fn sample_new_booking(booking_ref: &str) -> NewBooking {
    NewBooking {
        trip_id: Uuid::new_v4(),
        booking_ref: booking_ref.to_string(),
        contact: sample_contact(),
        company: None,
        consents: ConsentRecord {
            data_processing: true,
            terms: true,
            conditions: true,
            accepted_at: Utc::now(),
        },
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        source: BookingSource::PublicPage,
        notes: None,
    }
}

/// In-memory trip store with the same reserve/release semantics as the
/// Postgres conditional update.
#[derive(Default)]
pub struct MemoryTripRepository {
    trips: Mutex<HashMap<Uuid, Trip>>,
}

impl MemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, trip: Trip) {
        self.trips.lock().unwrap().insert(trip.id, trip);
    }

    pub fn seats_reserved(&self, trip_id: Uuid) -> i32 {
        self.trips
            .lock()
            .unwrap()
            .get(&trip_id)
            .map(|trip| trip.seats_reserved)
            .unwrap_or(0)
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Trip>, BoxError> {
        let trips = self.trips.lock().unwrap();
        Ok(trips
            .values()
            .find(|trip| {
                trip.is_active
                    && (trip.slug == slug || trip.public_slug.as_deref() == Some(slug))
            })
            .cloned())
    }

    async fn reserve_seats(&self, trip_id: Uuid, count: i32) -> Result<bool, BoxError> {
        let mut trips = self.trips.lock().unwrap();
        let trip = trips.get_mut(&trip_id).ok_or("trip not found")?;
        // Check and increment under one lock, like the conditional UPDATE.
        if trip.seats_reserved + count > trip.seats_total {
            return Ok(false);
        }
        trip.seats_reserved += count;
        Ok(true)
    }

    async fn release_seats(&self, trip_id: Uuid, count: i32) -> Result<(), BoxError> {
        let mut trips = self.trips.lock().unwrap();
        let trip = trips.get_mut(&trip_id).ok_or("trip not found")?;
        trip.seats_reserved = (trip.seats_reserved - count).max(0);
        Ok(())
    }
}

/// In-memory booking store with switches to force each failure mode the
/// dual-path writer has to survive.
#[derive(Default)]
pub struct MemoryBookingRepository {
    rows: Mutex<HashMap<Uuid, Booking>>,
    procedure_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    patch_calls: AtomicUsize,
    fail_procedure: AtomicBool,
    procedure_unavailable: AtomicBool,
    fail_insert: AtomicBool,
    fail_patch: AtomicBool,
    fail_token: AtomicBool,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_procedure(&self) {
        self.fail_procedure.store(true, Ordering::SeqCst);
    }

    pub fn procedure_unavailable(&self) {
        self.procedure_unavailable.store(true, Ordering::SeqCst);
    }

    pub fn fail_insert(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    pub fn fail_patch(&self) {
        self.fail_patch.store(true, Ordering::SeqCst);
    }

    pub fn fail_token_read(&self) {
        self.fail_token.store(true, Ordering::SeqCst);
    }

    pub fn procedure_calls(&self) -> usize {
        self.procedure_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn find(&self, id: Uuid) -> Option<Booking> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn build_row(&self, booking: &NewBooking, full_details: bool) -> Booking {
        let now = Utc::now();
        let mut contact = booking.contact.clone();
        if !full_details {
            // The minimal insert skips the optional name split; patch_details
            // fills it in afterwards.
            contact.first_name = None;
            contact.last_name = None;
        }
        Booking {
            id: Uuid::new_v4(),
            booking_ref: booking.booking_ref.clone(),
            access_token: Some(generate_access_token()),
            trip_id: booking.trip_id,
            contact,
            company: if full_details {
                booking.company.clone()
            } else {
                None
            },
            consents: booking.consents.clone(),
            status: booking.status,
            payment_status: booking.payment_status,
            source: booking.source,
            notes: booking.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create_via_procedure(
        &self,
        booking: &NewBooking,
    ) -> Result<Option<CreatedBooking>, BoxError> {
        self.procedure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_procedure.load(Ordering::SeqCst) {
            return Err("create_booking procedure failed".into());
        }
        if self.procedure_unavailable.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let row = self.build_row(booking, true);
        let created = CreatedBooking {
            id: row.id,
            booking_ref: row.booking_ref.clone(),
        };
        self.rows.lock().unwrap().insert(row.id, row);
        Ok(Some(created))
    }

    async fn insert_minimal(&self, booking: &NewBooking) -> Result<CreatedBooking, BoxError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err("booking insert failed".into());
        }
        let row = self.build_row(booking, false);
        let created = CreatedBooking {
            id: row.id,
            booking_ref: row.booking_ref.clone(),
        };
        self.rows.lock().unwrap().insert(row.id, row);
        Ok(created)
    }

    async fn patch_details(&self, id: Uuid, booking: &NewBooking) -> Result<(), BoxError> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_patch.load(Ordering::SeqCst) {
            return Err("booking patch failed".into());
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or("booking not found")?;
        row.contact.first_name = booking.contact.first_name.clone();
        row.contact.last_name = booking.contact.last_name.clone();
        row.company = booking.company.clone();
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn fetch_access_token(&self, id: Uuid) -> Result<Option<String>, BoxError> {
        if self.fail_token.load(Ordering::SeqCst) {
            return Err("privileged token read failed".into());
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).and_then(|row| row.access_token.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), BoxError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn find_by_ref(&self, booking_ref: &str) -> Result<Option<Booking>, BoxError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|row| row.booking_ref == booking_ref)
            .cloned())
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<(), BoxError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or("booking not found")?;
        row.payment_status = status;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or("booking not found")?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryParticipantRepository {
    rows: Mutex<Vec<Participant>>,
    fail_insert: AtomicBool,
}

impl MemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_insert(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    pub fn count_for(&self, booking_id: Uuid) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.booking_id == booking_id)
            .count()
    }
}

#[async_trait]
impl ParticipantRepository for MemoryParticipantRepository {
    async fn insert_batch(
        &self,
        booking_id: Uuid,
        participants: &[NewParticipant],
    ) -> Result<(), BoxError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err("participant insert failed".into());
        }
        let mut rows = self.rows.lock().unwrap();
        for participant in participants {
            rows.push(Participant {
                id: Uuid::new_v4(),
                booking_id,
                first_name: participant.first_name.clone(),
                last_name: participant.last_name.clone(),
                national_id: participant.national_id.clone(),
                email: participant.email.clone(),
                phone: participant.phone.clone(),
                document_type: participant.document_type.clone(),
                document_number: participant.document_number.clone(),
                address: participant.address.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Participant>, BoxError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.booking_id == booking_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAgreementRepository {
    rows: Mutex<Vec<Agreement>>,
}

impl MemoryAgreementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl AgreementRepository for MemoryAgreementRepository {
    async fn create(&self, agreement: &NewAgreement) -> Result<Agreement, BoxError> {
        let now = Utc::now();
        let row = Agreement {
            id: Uuid::new_v4(),
            booking_id: agreement.booking_id,
            status: agreement.status,
            pdf_url: agreement.pdf_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }
}

/// Mock renderer; returns a tiny PDF-shaped payload or a simulated outage.
#[derive(Default)]
pub struct MockAgreementRenderer {
    fail: AtomicBool,
}

impl MockAgreementRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgreementRenderer for MockAgreementRenderer {
    async fn render(&self, data: &AgreementData) -> Result<RenderedDocument, BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("pdf service unavailable".into());
        }
        Ok(RenderedDocument {
            filename: format!("agreement-{}.pdf", data.booking_ref),
            bytes: b"%PDF-1.4 mock agreement".to_vec(),
            url: Some(format!(
                "https://documents.example.com/agreements/{}.pdf",
                data.booking_ref
            )),
        })
    }
}

/// Mock mailer that records outgoing messages.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("smtp relay refused the message".into());
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Mock hosted-payment provider that records session requests.
#[derive(Default)]
pub struct MockPaymentProvider {
    sessions: Mutex<Vec<PaymentSessionRequest>>,
    fail: AtomicBool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sessions(&self) -> Vec<PaymentSessionRequest> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, BoxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("payment provider unavailable".into());
        }
        self.sessions.lock().unwrap().push(request.clone());
        Ok(PaymentSession {
            payment_id: format!("pay_{}", request.external_id),
            redirect_url: format!("https://pay.example.com/session/{}", request.external_id),
        })
    }
}
