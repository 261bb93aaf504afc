use std::sync::Arc;

use uuid::Uuid;
use wayfare_core::mail::{EmailAttachment, EmailMessage, Mailer};
use wayfare_core::payment::{PaymentProvider, PaymentSessionRequest};
use wayfare_core::pdf::{AgreementData, AgreementRenderer, ParticipantName, RenderedDocument};
use wayfare_core::repository::{AgreementRepository, NewAgreement};
use wayfare_shared::models::{AgreementStatus, CompanyDetails, ContactDetails, Trip};

#[derive(Clone)]
pub struct FulfillmentConfig {
    /// Customer-facing base URL the self-service links are built from
    pub public_base_url: String,
    /// Server-to-server webhook target handed to the payment provider
    pub payment_notification_url: String,
    /// Static document attached when rendering fails, if configured
    pub placeholder_document: Option<RenderedDocument>,
}

/// Everything the post-booking side effects need, captured once the booking
/// and its participants are durable.
#[derive(Clone)]
pub struct FulfillmentContext {
    pub booking_id: Uuid,
    pub booking_ref: String,
    pub trip: Trip,
    pub contact: ContactDetails,
    pub company: Option<CompanyDetails>,
    pub participants: Vec<ParticipantName>,
    pub access_token: Option<String>,
    pub with_payment: bool,
}

impl FulfillmentContext {
    fn seat_count(&self) -> i32 {
        self.participants.len() as i32
    }

    fn total_amount(&self) -> i32 {
        self.trip.price_per_seat * self.seat_count()
    }

    fn contact_name(&self) -> String {
        match (&self.contact.first_name, &self.contact.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.contact.email.expose().clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FulfillmentOutcome {
    pub booking_url: String,
    pub agreement_pdf_url: Option<String>,
    pub redirect_url: Option<String>,
}

/// Runs the three best-effort side effects after the transactional core has
/// committed: agreement PDF, confirmation email, optional payment session.
/// Each call has its own failure boundary; none of them can fail the
/// booking.
pub struct FulfillmentOrchestrator {
    renderer: Arc<dyn AgreementRenderer>,
    mailer: Arc<dyn Mailer>,
    payments: Arc<dyn PaymentProvider>,
    agreements: Arc<dyn AgreementRepository>,
    config: FulfillmentConfig,
}

impl FulfillmentOrchestrator {
    pub fn new(
        renderer: Arc<dyn AgreementRenderer>,
        mailer: Arc<dyn Mailer>,
        payments: Arc<dyn PaymentProvider>,
        agreements: Arc<dyn AgreementRepository>,
        config: FulfillmentConfig,
    ) -> Self {
        Self {
            renderer,
            mailer,
            payments,
            agreements,
            config,
        }
    }

    pub async fn run(&self, ctx: &FulfillmentContext) -> FulfillmentOutcome {
        let booking_url = self.booking_url(&ctx.booking_ref, ctx.access_token.as_deref());

        // The agreement feeds the email attachment, so it goes first; email
        // and payment are independent of each other and run concurrently.
        let document = self.generate_agreement(ctx).await;
        let agreement_pdf_url = document.as_ref().and_then(|doc| doc.url.clone());

        let (_, redirect_url) = tokio::join!(
            self.send_confirmation(ctx, &booking_url, document.as_ref()),
            self.create_payment_session(ctx, &booking_url),
        );

        FulfillmentOutcome {
            booking_url,
            agreement_pdf_url,
            redirect_url,
        }
    }

    /// Self-service link for the customer. Without a token the link still
    /// resolves to the booking page, which then asks for the reference
    /// details instead.
    pub fn booking_url(&self, booking_ref: &str, access_token: Option<&str>) -> String {
        let base = self.config.public_base_url.trim_end_matches('/');
        match access_token {
            Some(token) => format!("{}/booking/{}?token={}", base, booking_ref, token),
            None => format!("{}/booking/{}", base, booking_ref),
        }
    }

    async fn generate_agreement(&self, ctx: &FulfillmentContext) -> Option<RenderedDocument> {
        let data = AgreementData {
            booking_ref: ctx.booking_ref.clone(),
            trip_title: ctx.trip.title.clone(),
            trip_dates: format!("{} to {}", ctx.trip.starts_on, ctx.trip.ends_on),
            contact_name: ctx.contact_name(),
            contact_email: ctx.contact.email.expose().clone(),
            company_name: ctx.company.as_ref().map(|company| company.name.clone()),
            company_nip: ctx.company.as_ref().map(|company| company.nip.clone()),
            participants: ctx.participants.clone(),
        };

        match self.renderer.render(&data).await {
            Ok(document) => {
                let record = NewAgreement {
                    booking_id: ctx.booking_id,
                    status: AgreementStatus::Generated,
                    pdf_url: document.url.clone(),
                };
                if let Err(error) = self.agreements.create(&record).await {
                    tracing::warn!(
                        booking_ref = %ctx.booking_ref,
                        %error,
                        "agreement rendered but its record could not be stored"
                    );
                }
                Some(document)
            }
            Err(error) => {
                tracing::warn!(
                    booking_ref = %ctx.booking_ref,
                    %error,
                    "agreement rendering failed"
                );
                self.config.placeholder_document.clone()
            }
        }
    }

    async fn send_confirmation(
        &self,
        ctx: &FulfillmentContext,
        booking_url: &str,
        document: Option<&RenderedDocument>,
    ) {
        let subject = format!("Booking confirmation {}", ctx.booking_ref);
        let html = format!(
            "<p>Thank you for booking <strong>{}</strong>.</p>\
             <p>Your booking reference is <strong>{}</strong>.</p>\
             <p><a href=\"{}\">Manage your booking</a></p>",
            ctx.trip.title, ctx.booking_ref, booking_url
        );
        let text = format!(
            "Thank you for booking {}.\nYour booking reference is {}.\nManage your booking: {}",
            ctx.trip.title, ctx.booking_ref, booking_url
        );
        let message = EmailMessage {
            to: ctx.contact.email.expose().clone(),
            subject,
            html,
            text,
            attachment: document.map(|doc| EmailAttachment {
                filename: doc.filename.clone(),
                content_type: "application/pdf".to_string(),
                bytes: doc.bytes.clone(),
            }),
        };

        if let Err(error) = self.mailer.send(message).await {
            tracing::warn!(
                booking_ref = %ctx.booking_ref,
                %error,
                "confirmation email failed"
            );
        }
    }

    async fn create_payment_session(
        &self,
        ctx: &FulfillmentContext,
        booking_url: &str,
    ) -> Option<String> {
        let amount = ctx.total_amount();
        if !ctx.with_payment || amount <= 0 {
            return None;
        }

        let request = PaymentSessionRequest {
            amount,
            currency: ctx.trip.currency.clone(),
            external_id: ctx.booking_ref.clone(),
            description: format!("{} booking {}", ctx.trip.title, ctx.booking_ref),
            buyer_email: ctx.contact.email.expose().clone(),
            return_url: booking_url.to_string(),
            notification_url: self.config.payment_notification_url.clone(),
        };

        match self.payments.create_session(&request).await {
            Ok(session) => Some(session.redirect_url),
            Err(error) => {
                tracing::warn!(
                    booking_ref = %ctx.booking_ref,
                    %error,
                    "payment session creation failed, booking proceeds without redirect"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        sample_contact, sample_trip, MemoryAgreementRepository, MockAgreementRenderer, MockMailer,
        MockPaymentProvider,
    };

    fn config(placeholder: Option<RenderedDocument>) -> FulfillmentConfig {
        FulfillmentConfig {
            public_base_url: "https://wayfare.example.com".to_string(),
            payment_notification_url: "https://api.wayfare.example.com/webhooks/payments"
                .to_string(),
            placeholder_document: placeholder,
        }
    }

    fn context(with_payment: bool) -> FulfillmentContext {
        FulfillmentContext {
            booking_id: Uuid::new_v4(),
            booking_ref: "WF-2608061010-AB12".to_string(),
            trip: sample_trip("dolomites-weekend", 10, 2),
            contact: sample_contact(),
            company: None,
            participants: vec![
                ParticipantName {
                    first_name: "Anna".to_string(),
                    last_name: "Kowalska".to_string(),
                },
                ParticipantName {
                    first_name: "Jan".to_string(),
                    last_name: "Nowak".to_string(),
                },
            ],
            access_token: Some("token123".to_string()),
            with_payment,
        }
    }

    struct Harness {
        renderer: Arc<MockAgreementRenderer>,
        mailer: Arc<MockMailer>,
        payments: Arc<MockPaymentProvider>,
        agreements: Arc<MemoryAgreementRepository>,
        orchestrator: FulfillmentOrchestrator,
    }

    fn harness(placeholder: Option<RenderedDocument>) -> Harness {
        let renderer = Arc::new(MockAgreementRenderer::new());
        let mailer = Arc::new(MockMailer::new());
        let payments = Arc::new(MockPaymentProvider::new());
        let agreements = Arc::new(MemoryAgreementRepository::new());
        let orchestrator = FulfillmentOrchestrator::new(
            renderer.clone(),
            mailer.clone(),
            payments.clone(),
            agreements.clone(),
            config(placeholder),
        );
        Harness {
            renderer,
            mailer,
            payments,
            agreements,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_full_run_attaches_pdf_and_records_agreement() {
        let h = harness(None);
        let outcome = h.orchestrator.run(&context(false)).await;

        assert!(outcome.agreement_pdf_url.is_some());
        assert_eq!(h.agreements.count(), 1);
        let sent = h.mailer.last().unwrap();
        assert!(sent.subject.contains("WF-2608061010-AB12"));
        assert!(sent.html.contains(&outcome.booking_url));
        assert!(sent.attachment.is_some());
    }

    #[tokio::test]
    async fn test_renderer_failure_degrades_to_no_attachment() {
        let h = harness(None);
        h.renderer.fail();
        let outcome = h.orchestrator.run(&context(false)).await;

        assert_eq!(outcome.agreement_pdf_url, None);
        assert_eq!(h.agreements.count(), 0);
        // Email still goes out, just without the PDF.
        let sent = h.mailer.last().unwrap();
        assert!(sent.attachment.is_none());
    }

    #[tokio::test]
    async fn test_renderer_failure_uses_placeholder_when_configured() {
        let placeholder = RenderedDocument {
            filename: "general-terms.pdf".to_string(),
            bytes: b"%PDF-1.4 placeholder".to_vec(),
            url: None,
        };
        let h = harness(Some(placeholder));
        h.renderer.fail();
        h.orchestrator.run(&context(false)).await;

        let sent = h.mailer.last().unwrap();
        assert_eq!(sent.attachment.unwrap().filename, "general-terms.pdf");
    }

    #[tokio::test]
    async fn test_mailer_failure_does_not_block_outcome() {
        let h = harness(None);
        h.mailer.fail();
        let outcome = h.orchestrator.run(&context(true)).await;

        assert!(outcome.booking_url.contains("WF-2608061010-AB12"));
        assert!(outcome.redirect_url.is_some());
    }

    #[tokio::test]
    async fn test_payment_session_amount_is_price_times_participants() {
        let h = harness(None);
        let ctx = context(true);
        let outcome = h.orchestrator.run(&ctx).await;

        assert!(outcome.redirect_url.is_some());
        let sessions = h.payments.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].amount, ctx.trip.price_per_seat * 2);
        assert_eq!(sessions[0].external_id, ctx.booking_ref);
        assert_eq!(sessions[0].return_url, outcome.booking_url);
    }

    #[tokio::test]
    async fn test_payment_skipped_without_opt_in() {
        let h = harness(None);
        let outcome = h.orchestrator.run(&context(false)).await;

        assert_eq!(outcome.redirect_url, None);
        assert!(h.payments.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_payment_skipped_for_free_trip() {
        let h = harness(None);
        let mut ctx = context(true);
        ctx.trip.price_per_seat = 0;
        let outcome = h.orchestrator.run(&ctx).await;

        assert_eq!(outcome.redirect_url, None);
        assert!(h.payments.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_payment_failure_is_absorbed() {
        let h = harness(None);
        h.payments.fail();
        let outcome = h.orchestrator.run(&context(true)).await;

        assert_eq!(outcome.redirect_url, None);
        assert!(h.mailer.last().is_some());
    }

    #[tokio::test]
    async fn test_missing_token_builds_fallback_url() {
        let h = harness(None);
        let mut ctx = context(false);
        ctx.access_token = None;
        let outcome = h.orchestrator.run(&ctx).await;

        assert!(!outcome.booking_url.contains("token="));
        assert!(outcome.booking_url.ends_with("/booking/WF-2608061010-AB12"));
    }
}
