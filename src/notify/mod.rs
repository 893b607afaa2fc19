//! Booking confirmation emails.
//!
//! Messages go out through a `NotificationSender`. A dispatch sends one
//! message per recipient concurrently and reports a single outcome once
//! every send has finished.

mod http;

pub use http::*;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::Booking;

/// Errors raised while preparing or sending notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Subject is empty")]
    EmptySubject,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("No valid recipient addresses")]
    NoValidRecipients,

    #[error("Failed to send {failed} out of {attempted} emails")]
    PartialFailure { failed: usize, attempted: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),
}

/// One outgoing email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailMessage {
    /// Message to one recipient; the HTML body is rendered from `text`.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            to: to.into(),
            subject: subject.into(),
            html: text_to_html(&text),
            text,
        }
    }
}

/// Outcome of a dispatch in which every send succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    /// Addresses dropped for failing the shape check
    pub skipped: usize,
}

/// Delivers a single email.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sender name for logging.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Sender that only logs, used when no provider is configured.
#[derive(Debug, Default)]
pub struct DryRunSender;

#[async_trait]
impl NotificationSender for DryRunSender {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!("[dry-run] email to {}: {}", message.to, message.subject);
        debug!("[dry-run] body:\n{}", message.text);
        Ok(())
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// Whether `addr` looks like `local@domain.tld` with no whitespace.
pub fn is_valid_email(addr: &str) -> bool {
    email_regex().is_match(addr)
}

/// Split a free-form recipient list on commas, semicolons and whitespace.
pub fn parse_recipients(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render plain text as HTML, one `<br>` per line break.
pub fn text_to_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    for c in text.replace("\r\n", "\n").chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\n' => html.push_str("<br>"),
            _ => html.push(c),
        }
    }
    html
}

/// Default subject and body confirming a booking.
pub fn compose_confirmation(booking: &Booking) -> (String, String) {
    let players: Vec<&str> = booking.active_players().collect();
    let subject = format!(
        "Court {} booked for {}",
        booking.court,
        booking.date.format("%A %-d %B %Y")
    );
    let body = format!(
        "Your tennis court booking is confirmed.\n\n\
         Date: {}\n\
         Time: {}\n\
         Court: {}\n\
         Match: {}\n\
         Players: {}\n\n\
         See you on court!",
        booking.date.format("%A %-d %B %Y"),
        booking.time_slot,
        booking.court,
        booking.match_type,
        players.join(", ")
    );
    (subject, body)
}

/// Send `subject`/`body` to every valid recipient concurrently.
///
/// Invalid addresses are dropped. Nothing is sent when the subject or body
/// is blank or when no valid address remains. If any send fails the whole
/// dispatch is reported as failed with the failure count.
pub async fn dispatch(
    sender: Arc<dyn NotificationSender>,
    recipients: &[String],
    subject: &str,
    body: &str,
) -> Result<DispatchReport, NotifyError> {
    if subject.trim().is_empty() {
        return Err(NotifyError::EmptySubject);
    }
    if body.trim().is_empty() {
        return Err(NotifyError::EmptyMessage);
    }

    let valid: Vec<&str> = recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| is_valid_email(r))
        .collect();
    let skipped = recipients.len() - valid.len();
    if valid.is_empty() {
        return Err(NotifyError::NoValidRecipients);
    }

    let attempted = valid.len();
    let mut tasks = JoinSet::new();
    for to in valid {
        let sender = Arc::clone(&sender);
        let message = EmailMessage::new(to, subject, body);
        tasks.spawn(async move {
            let result = sender.send(&message).await;
            (message.to, result)
        });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((to, Err(e))) => {
                warn!("Failed to send email to {} via {}: {}", to, sender.name(), e);
                failed += 1;
            }
            Err(e) => {
                warn!("Email task aborted: {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(NotifyError::PartialFailure { failed, attempted });
    }

    info!("Sent {} emails via {}", attempted, sender.name());
    Ok(DispatchReport {
        attempted,
        succeeded: attempted,
        skipped,
    })
}
