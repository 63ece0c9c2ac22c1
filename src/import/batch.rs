//! Dispatch import: parse a batch, drop rejects and duplicates.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::error::{DispatchError, Result};
use crate::model::email::RawEmail;
use crate::model::work_order::WorkOrderDraft;
use crate::parser::dispatch::parse_email;
use crate::parser::ParseOptions;

/// Outcome of one import run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportReport {
    /// `false` when the batch was refused.
    pub success: bool,
    pub imported: usize,
    /// Emails without a work-order number (or the whole batch, when refused).
    pub skipped: usize,
    /// Emails whose work-order number is already stored or was seen earlier in the batch.
    pub duplicates: usize,
    /// New drafts, in input order.
    pub drafts: Vec<WorkOrderDraft>,
    pub message: String,
}

/// Import a batch of dispatch emails.
///
/// `existing` holds the work-order numbers already stored. Unattended
/// (`manual == false`) runs refuse batches larger than
/// `config.max_auto_import` outright. Drafts from manual runs are stamped
/// "Manually imported" instead of "Auto-imported".
pub fn import_batch(
    emails: &[RawEmail],
    existing: &HashSet<String>,
    options: &ParseOptions,
    config: &ImportConfig,
    manual: bool,
) -> ImportReport {
    let mut report = ImportReport {
        success: true,
        ..Default::default()
    };

    if !manual && emails.len() > config.max_auto_import {
        warn!(
            count = emails.len(),
            limit = config.max_auto_import,
            "Batch exceeds automatic import limit"
        );
        report.success = false;
        report.skipped = emails.len();
        report.message = format!(
            "Found {} emails - too many for automatic import. Use a manual import or archive old emails.",
            emails.len()
        );
        return report;
    }

    if emails.is_empty() {
        report.message = "No new dispatch emails found".to_string();
        return report;
    }

    let options = ParseOptions {
        manual,
        ..options.clone()
    };
    let mut seen: HashSet<String> = existing.clone();

    for email in emails {
        let draft = match parse_email(email, &options) {
            Ok(draft) => draft,
            Err(rejection) => {
                warn!(subject = %email.subject, reason = %rejection, "Skipping email");
                report.skipped += 1;
                continue;
            }
        };

        if !seen.insert(draft.wo_number.clone()) {
            info!(wo = %draft.wo_number, "Work order already exists, skipping");
            report.duplicates += 1;
            continue;
        }

        info!(wo = %draft.wo_number, priority = %draft.priority, "Imported work order");
        report.imported += 1;
        report.drafts.push(draft);
    }

    report.message = if report.imported > 0 {
        format!("Imported {} work order(s)", report.imported)
    } else {
        "No new work orders to import".to_string()
    };
    report
}

/// Write `report` to `path` as pretty-printed JSON.
pub fn write_report(report: &ImportReport, path: &Path) -> Result<()> {
    let rendered = serde_json::to_string_pretty(report)?;
    std::fs::write(path, rendered).map_err(|e| DispatchError::io(path, e))
}
