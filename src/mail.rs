//! Outgoing mail for the contact auto-reply.
//!
//! [`SmtpMailer`] sends through an authenticated STARTTLS relay;
//! [`MemoryMailer`] only records what it was asked to send.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tokio::sync::RwLock;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, address: &str, password: &str) -> Result<Self, AppError> {
        let from: Mailbox = address
            .parse()
            .map_err(|e| AppError::EnvError(format!("EMAIL_ADDRESS is not a valid address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::MailError(format!("Failed to configure SMTP relay: {}", e)))?
            .port(port)
            .credentials(Credentials::new(address.to_string(), password.to_string()))
            .build();

        tracing::info!("SMTP mailer configured for {}:{}", host, port);
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid recipient: {}", mail.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text)
            .map_err(|e| AppError::MailError(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::MailError(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMailer {
    sent: RwLock<Vec<OutgoingMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        tracing::debug!("Recorded mail to {}", mail.to);
        self.sent.write().await.push(mail);
        Ok(())
    }
}
