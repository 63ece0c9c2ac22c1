//! Reader for individual `.eml` files (RFC 5322 messages).

use std::path::Path;

use chrono::{DateTime, Utc};
use mail_parser::{Message, MessageParser, PartType};

use crate::error::{DispatchError, Result};
use crate::model::email::RawEmail;

/// Read a single `.eml` file into a [`RawEmail`].
///
/// A real `text/html` part is preferred over plain text, since that is what
/// the dispatch parser expects; plain-text-only messages keep their raw text. Messages `mail-parser` cannot make sense of are
/// split at the first blank line instead.
pub fn read_eml(path: impl AsRef<Path>) -> Result<RawEmail> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DispatchError::FileNotFound(path.to_path_buf())
        } else {
            DispatchError::io(path, e)
        }
    })?;

    if data.is_empty() {
        return Err(DispatchError::InvalidEmail(path.to_path_buf()));
    }

    Ok(parse_message(&data))
}

/// Parse raw message bytes into a [`RawEmail`].
pub fn parse_message(data: &[u8]) -> RawEmail {
    let parser = MessageParser::default();

    if let Some(msg) = parser.parse(data) {
        let subject = msg.subject().unwrap_or_default().to_string();
        let body = if has_html_part(&msg) {
            msg.body_html(0)
        } else {
            msg.body_text(0)
        }
        .map(|s| s.into_owned())
        .unwrap_or_default();
        let received_at = msg
            .date()
            .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        return RawEmail {
            subject,
            body,
            received_at,
        };
    }

    tracing::warn!("mail-parser could not parse message, splitting headers manually");
    let text = decode_bytes(data);
    let (headers, body) = split_headers(&text);
    let subject = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("subject")
                .then(|| value.trim().to_string())
        })
        .unwrap_or_default();

    RawEmail {
        subject,
        body: body.to_string(),
        received_at: Utc::now(),
    }
}

/// `mail-parser` renders text-only messages as HTML on request; only a part
/// that was HTML on the wire counts.
fn has_html_part(msg: &Message<'_>) -> bool {
    msg.html_part(0)
        .is_some_and(|part| matches!(part.body, PartType::Html(_)))
}

/// UTF-8 when valid, Windows-1252 otherwise.
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Split at the first blank line into `(headers, body)`.
fn split_headers(text: &str) -> (&str, &str) {
    if let Some(pos) = text.find("\r\n\r\n") {
        (&text[..pos], &text[pos + 4..])
    } else if let Some(pos) = text.find("\n\n") {
        (&text[..pos], &text[pos + 2..])
    } else {
        (text, "")
    }
}
