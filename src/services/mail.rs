//! Sending plain-text email through an SMTP relay

use crate::integration::config::MailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    #[error("Email credentials are not set")]
    MissingCredentials,

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to send email: {0}")]
    Transport(String),
}

pub trait MailService {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Result<(&str, &str), MailError> {
        let address = self.config.address.as_deref().map(str::trim).unwrap_or_default();
        let password = self.config.password.as_deref().unwrap_or_default();
        if address.is_empty() || password.is_empty() {
            return Err(MailError::MissingCredentials);
        }
        Ok((address, password))
    }
}

impl MailService for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let (address, password) = self.credentials()?;
        let message = build_message(address, mail)?;

        debug!(
            "Connecting to {}:{}",
            self.config.smtp_host, self.config.smtp_port
        );
        let transport = SmtpTransport::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(address.to_string(), password.to_string()))
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!("Email sent to {}", mail.to);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn build_message(from: &str, mail: &OutgoingMail) -> Result<Message, MailError> {
    Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|e| MailError::Transport(e.to_string()))
}
