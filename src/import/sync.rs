//! Status sync: interpret labeled follow-up emails.

use tracing::warn;

use crate::model::email::RawEmail;
use crate::model::status::StatusUpdate;
use crate::model::work_order::Rejection;
use crate::parser::status::interpret;

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SyncReport {
    pub processed: usize,
    pub updates: Vec<StatusUpdate>,
    /// One human-readable line per email that produced no update.
    pub errors: Vec<String>,
}

/// Interpret every `(label, email)` pair.
///
/// Whether each referenced work order exists is left to the caller.
pub fn sync_statuses<'a>(
    labeled: impl IntoIterator<Item = (&'a str, &'a RawEmail)>,
) -> SyncReport {
    let mut report = SyncReport::default();

    for (label, email) in labeled {
        report.processed += 1;
        match interpret(label, &email.subject, &email.body) {
            Ok(update) => report.updates.push(update),
            Err(rejection) => {
                let line = match &rejection {
                    Rejection::NoWorkOrderNumber => format!(
                        "Could not find WO# in: {}",
                        email.subject.chars().take(50).collect::<String>()
                    ),
                    Rejection::UnknownLabel(_) => rejection.to_string(),
                };
                warn!(label, subject = %email.subject, reason = %rejection, "No status update");
                report.errors.push(line);
            }
        }
    }

    report
}
