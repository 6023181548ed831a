//! Outgoing email.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{MailFrom, SmtpConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address `{address}`: {reason}")]
    Address { address: String, reason: String },

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail delivery disabled")]
    Disabled,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: raw.to_string(),
        reason: e.to_string(),
    })
}

/// STARTTLS relay with username/password credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, from: &MailFrom) -> Result<Self, MailError> {
        let from = Mailbox::new(Some(from.name.clone()), parse_address(&from.email)?);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject), err)]
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, parse_address(&message.to)?))
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.text)?;

        let response = self.transport.send(email).await?;
        info!(code = %response.code(), "message sent");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "smtp not configured; email logged instead of sent"
        );
        Ok(())
    }
}

/// Keeps every message in memory. Can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    outbox: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent().pop()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Disabled);
        }
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}
