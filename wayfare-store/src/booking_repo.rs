use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;
use wayfare_core::repository::{
    AgreementRepository, BookingRepository, BoxError, CreatedBooking, NewAgreement, NewBooking,
    NewParticipant, ParticipantRepository,
};
use wayfare_shared::models::{
    Address, Agreement, Booking, BookingSource, BookingStatus, CompanyDetails, ConsentRecord,
    ContactDetails, Participant, PaymentStatus,
};

pub struct StoreBookingRepository {
    pool: PgPool,
    /// Service-role pool; used only for the access-token read that the
    /// request-scoped role cannot see.
    service_pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool, service_pool: PgPool) -> Self {
        Self { pool, service_pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_ref: String,
    trip_id: Uuid,
    contact_first_name: Option<String>,
    contact_last_name: Option<String>,
    contact_email: String,
    contact_phone: String,
    contact_street: String,
    contact_city: String,
    contact_zip: String,
    company_name: Option<String>,
    company_nip: Option<String>,
    company_address: Option<String>,
    consent_data_processing: bool,
    consent_terms: bool,
    consent_conditions: bool,
    consents_accepted_at: DateTime<Utc>,
    status: String,
    payment_status: String,
    source: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(value: &str) -> Result<BookingStatus, BoxError> {
    match value {
        "pending" => Ok(BookingStatus::Pending),
        "confirmed" => Ok(BookingStatus::Confirmed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(format!("unknown booking status: {}", other).into()),
    }
}

fn parse_payment_status(value: &str) -> Result<PaymentStatus, BoxError> {
    match value {
        "unpaid" => Ok(PaymentStatus::Unpaid),
        "partial" => Ok(PaymentStatus::Partial),
        "paid" => Ok(PaymentStatus::Paid),
        "overpaid" => Ok(PaymentStatus::Overpaid),
        other => Err(format!("unknown payment status: {}", other).into()),
    }
}

fn parse_source(value: &str) -> Result<BookingSource, BoxError> {
    match value {
        "public_page" => Ok(BookingSource::PublicPage),
        "admin_panel" => Ok(BookingSource::AdminPanel),
        other => Err(format!("unknown booking source: {}", other).into()),
    }
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, BoxError> {
        let company = self.company_nip.map(|nip| CompanyDetails {
            name: self.company_name.unwrap_or_default(),
            nip,
            address: self.company_address,
        });
        Ok(Booking {
            id: self.id,
            booking_ref: self.booking_ref,
            // Normal reads never include the token; see fetch_access_token.
            access_token: None,
            trip_id: self.trip_id,
            contact: ContactDetails {
                first_name: self.contact_first_name,
                last_name: self.contact_last_name,
                email: self.contact_email.into(),
                phone: self.contact_phone.into(),
                address: Address {
                    street: self.contact_street,
                    city: self.contact_city,
                    zip: self.contact_zip,
                },
            },
            company,
            consents: ConsentRecord {
                data_processing: self.consent_data_processing,
                terms: self.consent_terms,
                conditions: self.consent_conditions,
                accepted_at: self.consents_accepted_at,
            },
            status: parse_status(&self.status)?,
            payment_status: parse_payment_status(&self.payment_status)?,
            source: parse_source(&self.source)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = r#"
    id, booking_ref, trip_id,
    contact_first_name, contact_last_name, contact_email, contact_phone,
    contact_street, contact_city, contact_zip,
    company_name, company_nip, company_address,
    consent_data_processing, consent_terms, consent_conditions, consents_accepted_at,
    status, payment_status, source, notes, created_at, updated_at
"#;

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_via_procedure(
        &self,
        booking: &NewBooking,
    ) -> Result<Option<CreatedBooking>, BoxError> {
        let row = sqlx::query(
            r#"
            SELECT id, booking_ref
            FROM create_booking(
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            "#,
        )
        .bind(booking.trip_id)
        .bind(&booking.booking_ref)
        .bind(&booking.contact.first_name)
        .bind(&booking.contact.last_name)
        .bind(booking.contact.email.expose())
        .bind(booking.contact.phone.expose())
        .bind(&booking.contact.address.street)
        .bind(&booking.contact.address.city)
        .bind(&booking.contact.address.zip)
        .bind(booking.company.as_ref().map(|company| company.name.clone()))
        .bind(booking.company.as_ref().map(|company| company.nip.clone()))
        .bind(
            booking
                .company
                .as_ref()
                .and_then(|company| company.address.clone()),
        )
        .bind(booking.consents.data_processing)
        .bind(booking.consents.terms)
        .bind(booking.consents.conditions)
        .bind(booking.consents.accepted_at)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.source.as_str())
        .bind(&booking.notes)
        .fetch_optional(&self.service_pool)
        .await?;

        Ok(row.map(|row| CreatedBooking {
            id: row.get("id"),
            booking_ref: row.get("booking_ref"),
        }))
    }

    async fn insert_minimal(&self, booking: &NewBooking) -> Result<CreatedBooking, BoxError> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (
                trip_id, booking_ref,
                contact_email, contact_phone,
                contact_street, contact_city, contact_zip,
                consent_data_processing, consent_terms, consent_conditions,
                consents_accepted_at, status, payment_status, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, booking_ref
            "#,
        )
        .bind(booking.trip_id)
        .bind(&booking.booking_ref)
        .bind(booking.contact.email.expose())
        .bind(booking.contact.phone.expose())
        .bind(&booking.contact.address.street)
        .bind(&booking.contact.address.city)
        .bind(&booking.contact.address.zip)
        .bind(booking.consents.data_processing)
        .bind(booking.consents.terms)
        .bind(booking.consents.conditions)
        .bind(booking.consents.accepted_at)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.source.as_str())
        .fetch_one(&self.service_pool)
        .await?;

        Ok(CreatedBooking {
            id: row.get("id"),
            booking_ref: row.get("booking_ref"),
        })
    }

    async fn patch_details(&self, id: Uuid, booking: &NewBooking) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET contact_first_name = $2,
                contact_last_name = $3,
                company_name = $4,
                company_nip = $5,
                company_address = $6,
                notes = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&booking.contact.first_name)
        .bind(&booking.contact.last_name)
        .bind(booking.company.as_ref().map(|company| company.name.clone()))
        .bind(booking.company.as_ref().map(|company| company.nip.clone()))
        .bind(
            booking
                .company
                .as_ref()
                .and_then(|company| company.address.clone()),
        )
        .bind(&booking.notes)
        .execute(&self.service_pool)
        .await?;

        Ok(())
    }

    async fn fetch_access_token(&self, id: Uuid) -> Result<Option<String>, BoxError> {
        let row = sqlx::query("SELECT access_token FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.service_pool)
            .await?;

        Ok(row.and_then(|row| row.get::<Option<String>, _>("access_token")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.service_pool)
            .await?;

        Ok(())
    }

    async fn find_by_ref(&self, booking_ref: &str) -> Result<Option<Booking>, BoxError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE booking_ref = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_ref)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<(), BoxError> {
        sqlx::query("UPDATE bookings SET payment_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.service_pool)
            .await?;

        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        sqlx::query("UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.service_pool)
            .await?;

        Ok(())
    }
}

pub struct StoreParticipantRepository {
    pool: PgPool,
}

impl StoreParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    id: Uuid,
    booking_id: Uuid,
    first_name: String,
    last_name: String,
    national_id: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    document_type: Option<String>,
    document_number: Option<String>,
    street: String,
    city: String,
    zip: String,
    created_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            id: row.id,
            booking_id: row.booking_id,
            first_name: row.first_name,
            last_name: row.last_name,
            national_id: row.national_id,
            email: row.email,
            phone: row.phone,
            document_type: row.document_type,
            document_number: row.document_number,
            address: Address {
                street: row.street,
                city: row.city,
                zip: row.zip,
            },
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ParticipantRepository for StoreParticipantRepository {
    async fn insert_batch(
        &self,
        booking_id: Uuid,
        participants: &[NewParticipant],
    ) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;

        for participant in participants {
            sqlx::query(
                r#"
                INSERT INTO participants (
                    booking_id, first_name, last_name, national_id,
                    email, phone, document_type, document_number,
                    street, city, zip
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(booking_id)
            .bind(&participant.first_name)
            .bind(&participant.last_name)
            .bind(&participant.national_id)
            .bind(&participant.email)
            .bind(&participant.phone)
            .bind(&participant.document_type)
            .bind(&participant.document_number)
            .bind(&participant.address.street)
            .bind(&participant.address.city)
            .bind(&participant.address.zip)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Participant>, BoxError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT id, booking_id, first_name, last_name, national_id,
                   email, phone, document_type, document_number,
                   street, city, zip, created_at
            FROM participants
            WHERE booking_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }
}

pub struct StoreAgreementRepository {
    pool: PgPool,
}

impl StoreAgreementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementRepository for StoreAgreementRepository {
    async fn create(&self, agreement: &NewAgreement) -> Result<Agreement, BoxError> {
        let row = sqlx::query(
            r#"
            INSERT INTO agreements (booking_id, status, pdf_url)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(agreement.booking_id)
        .bind(agreement.status.as_str())
        .bind(&agreement.pdf_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(Agreement {
            id: row.get("id"),
            booking_id: agreement.booking_id,
            status: agreement.status,
            pdf_url: agreement.pdf_url.clone(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
