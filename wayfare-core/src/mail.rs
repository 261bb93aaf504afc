use async_trait::async_trait;

use crate::repository::BoxError;

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachment: Option<EmailAttachment>,
}

/// Adapter for the transactional email sender. Fire-and-forget from the
/// booking pipeline's perspective.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), BoxError>;
}
