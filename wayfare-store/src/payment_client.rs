use async_trait::async_trait;
use wayfare_core::payment::{PaymentProvider, PaymentSession, PaymentSessionRequest};
use wayfare_core::repository::BoxError;

use crate::app_config::PaymentConfig;

/// Client for the hosted payment page provider. One call opens a session;
/// the customer is sent to the returned redirect and the provider reports
/// the final status to the notification URL.
pub struct HttpPaymentProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentProvider {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, BoxError> {
        let session = self
            .http
            .post(format!("{}/sessions", self.api_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<PaymentSession>()
            .await?;

        Ok(session)
    }
}
