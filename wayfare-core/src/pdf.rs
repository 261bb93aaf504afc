use async_trait::async_trait;
use serde::Serialize;

use crate::repository::BoxError;

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantName {
    pub first_name: String,
    pub last_name: String,
}

/// Data the agreement template is filled from
#[derive(Debug, Clone, Serialize)]
pub struct AgreementData {
    pub booking_ref: String,
    pub trip_title: String,
    pub trip_dates: String,
    pub contact_name: String,
    pub contact_email: String,
    pub company_name: Option<String>,
    pub company_nip: Option<String>,
    pub participants: Vec<ParticipantName>,
}

/// A rendered agreement document, decoded and ready to attach
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Hosted location of the document when the rendering service stores it
    pub url: Option<String>,
}

/// Adapter for the external PDF rendering service.
#[async_trait]
pub trait AgreementRenderer: Send + Sync {
    async fn render(&self, data: &AgreementData) -> Result<RenderedDocument, BoxError>;
}
