//! Raw inbound email as handed over by a mail collector.

use chrono::{DateTime, Utc};

/// An inbound email, exactly as delivered by IMAP or the Gmail API.
///
/// `body` is whatever the collector produced: usually the HTML part, still
/// carrying quoted-printable artifacts such as `=3D` and soft line breaks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawEmail {
    /// Decoded `Subject:` header.
    pub subject: String,

    /// Message body (HTML preferred, otherwise plain text).
    pub body: String,

    /// When the message was received (from the `Date:` header when available).
    pub received_at: DateTime<Utc>,
}

impl RawEmail {
    /// Build an email received "now". Mostly useful for tests and ad-hoc input.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            received_at: Utc::now(),
        }
    }
}
