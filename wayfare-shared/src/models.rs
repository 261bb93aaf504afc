use crate::pii::Masked;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Settlement state of a booking, driven by payment webhooks and back office
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Overpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overpaid => "overpaid",
        }
    }
}

/// Where the booking was submitted from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    PublicPage,
    AdminPanel,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::PublicPage => "public_page",
            BookingSource::AdminPanel => "admin_panel",
        }
    }
}

/// Agreement document lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    Generated,
    Sent,
    Signed,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Generated => "generated",
            AgreementStatus::Sent => "sent",
            AgreementStatus::Signed => "signed",
        }
    }
}

/// A sellable trip with a fixed seat pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub public_slug: Option<String>,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    /// Price per seat in minor currency units
    pub price_per_seat: i32,
    pub currency: String,
    pub seats_total: i32,
    pub seats_reserved: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Seats still open for sale. Never negative, even if the counters
    /// were corrected by hand in the back office.
    pub fn seats_available(&self) -> i32 {
        (self.seats_total - self.seats_reserved).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

/// Contact details captured at booking time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub address: Address,
}

/// Company billing details for corporate bookings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub name: String,
    pub nip: String,
    pub address: Option<String>,
}

/// Per-consent acceptance record, stamped when the request is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub data_processing: bool,
    pub terms: bool,
    pub conditions: bool,
    pub accepted_at: DateTime<Utc>,
}

/// The single source of truth for a customer's reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-typeable unique reference, distinct from the internal id
    pub booking_ref: String,
    /// Opaque self-service secret; only readable through the privileged path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub trip_id: Uuid,
    pub contact: ContactDetails,
    pub company: Option<CompanyDetails>,
    pub consents: ConsentRecord,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub source: BookingSource,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A traveler on a booking; never exists without one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

/// Agreement document attached to a booking after PDF generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub status: AgreementStatus,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
