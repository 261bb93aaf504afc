use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repository::BoxError;

/// Everything the hosted payment page needs to open a session
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSessionRequest {
    /// Amount in minor currency units
    pub amount: i32,
    pub currency: String,
    /// Merchant-side id shown in the provider panel; we pass the booking ref
    pub external_id: String,
    pub description: String,
    pub buyer_email: String,
    /// Where the provider sends the customer back after payment
    pub return_url: String,
    /// Server-to-server status webhook target
    pub notification_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSession {
    pub payment_id: String,
    pub redirect_url: String,
}

/// Adapter for the external hosted-payment-page provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a payment session and return the customer redirect.
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, BoxError>;
}
