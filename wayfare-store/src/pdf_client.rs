use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use wayfare_core::pdf::{AgreementData, AgreementRenderer, RenderedDocument};
use wayfare_core::repository::BoxError;

/// Client for the external PDF rendering service. The service fills the
/// agreement template and answers with the document as base64 plus an
/// optional hosted location.
pub struct HttpAgreementRenderer {
    http: reqwest::Client,
    service_url: String,
}

impl HttpAgreementRenderer {
    pub fn new(service_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    base64: String,
    filename: String,
    url: Option<String>,
}

#[async_trait]
impl AgreementRenderer for HttpAgreementRenderer {
    async fn render(&self, data: &AgreementData) -> Result<RenderedDocument, BoxError> {
        let response = self
            .http
            .post(format!("{}/render", self.service_url.trim_end_matches('/')))
            .json(data)
            .send()
            .await?
            .error_for_status()?
            .json::<RenderResponse>()
            .await?;

        let bytes = BASE64.decode(response.base64.as_bytes())?;

        Ok(RenderedDocument {
            filename: response.filename,
            bytes,
            url: response.url,
        })
    }
}
