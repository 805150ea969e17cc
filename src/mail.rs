//! Outbound transactional e-mail.
//!
//! [`Mailer`] is the seam the rest of the crate talks to. [`MailerSendClient`]
//! posts to the MailerSend HTTP API; [`LogMailer`] only logs and is used when no
//! API key is configured.

use crate::config::settings::MailConfig;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// A single addressee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Address
    pub email: String,
    /// Display name
    pub name: String,
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Addressees
    pub to: Vec<Recipient>,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Plain text body
    pub text: String,
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the message.
    ///
    /// # Errors
    /// Returns [`Error::Mail`] or [`Error::Http`] if delivery fails.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

#[derive(Serialize)]
struct Sender<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct MailerSendRequest<'a> {
    from: Sender<'a>,
    to: &'a [Recipient],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// MailerSend e-mail API client.
pub struct MailerSendClient {
    client: Client,
    api_key: String,
    config: MailConfig,
}

impl MailerSendClient {
    /// Create a client for the endpoint and sender in `config`.
    pub fn new(api_key: String, config: MailConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config {
                message: "MailerSend API key is empty".to_string(),
            });
        }
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }
}

#[async_trait]
impl Mailer for MailerSendClient {
    #[instrument(skip_all, fields(subject = %email.subject, recipients = email.to.len()))]
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let body = MailerSendRequest {
            from: Sender {
                email: &self.config.sender_email,
                name: &self.config.sender_name,
            },
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Email accepted by MailerSend");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        error!(%status, body = %text, "MailerSend rejected email");
        Err(Error::Mail {
            message: format!(
                "MailerSend returned {status}: {}",
                text.chars().take(200).collect::<String>()
            ),
        })
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        for recipient in &email.to {
            info!(
                to = %recipient.email,
                subject = %email.subject,
                "Email not sent (no mail API key configured): {}",
                email.text
            );
        }
        Ok(())
    }
}

/// Renders the verification code e-mail for `address`.
#[must_use]
pub fn verification_email(address: &str, code: &str, ttl_minutes: i64) -> OutgoingEmail {
    let text = format!(
        "Your Datifyy verification code is {code}. It expires in {ttl_minutes} minutes."
    );
    let html = format!(
        "<p>Your Datifyy verification code is</p>\
         <h2 style=\"letter-spacing:4px\">{code}</h2>\
         <p>It expires in {ttl_minutes} minutes. If you did not ask for it, ignore this email.</p>"
    );
    OutgoingEmail {
        to: vec![Recipient {
            email: address.to_string(),
            name: address.to_string(),
        }],
        subject: "Verify your email".to_string(),
        html,
        text,
    }
}
