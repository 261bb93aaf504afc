use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use wayfare_core::mail::{EmailMessage, Mailer};
use wayfare_core::repository::BoxError;

use crate::app_config::SmtpConfig;

/// SMTP-backed transactional mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, BoxError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email).parse()?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), BoxError> {
        let to: Mailbox = message.to.parse()?;
        let body = MultiPart::alternative_plain_html(message.text, message.html);

        let email = match message.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)?;
                Message::builder()
                    .from(self.from.clone())
                    .to(to)
                    .subject(message.subject)
                    .multipart(
                        MultiPart::mixed().multipart(body).singlepart(
                            Attachment::new(attachment.filename)
                                .body(attachment.bytes, content_type),
                        ),
                    )?
            }
            None => Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(message.subject)
                .multipart(body)?,
        };

        self.transport.send(email).await?;

        Ok(())
    }
}
