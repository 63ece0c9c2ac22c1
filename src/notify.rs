//! Notification texts for office staff.
//!
//! Only composition lives here; delivery (SMS gateways, SMTP, push) belongs
//! to whatever service consumes these strings.

use crate::model::status::{CbreStatus, StatusUpdate};
use crate::model::work_order::{Priority, WorkOrderDraft};

/// Marker placed in front of each imported work order.
pub fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Emergency => "🔴",
        Priority::High => "🟠",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Subject line of the "new work orders imported" email.
pub fn import_subject(drafts: &[WorkOrderDraft]) -> String {
    let count = drafts.len();
    let emergencies = drafts
        .iter()
        .filter(|d| d.priority == Priority::Emergency)
        .count();
    let prefix = if emergencies > 0 { "EMERGENCY: " } else { "" };
    format!(
        "{prefix}{count} New Work Order{} Auto-Imported",
        plural(count)
    )
}

/// One line per imported work order, e.g. `🟠 C2959324 - SCCAE (HIGH)`.
pub fn import_lines(drafts: &[WorkOrderDraft]) -> Vec<String> {
    drafts
        .iter()
        .map(|d| {
            format!(
                "{} {} - {} ({})",
                priority_marker(d.priority),
                d.wo_number,
                d.building,
                d.priority.as_str().to_uppercase()
            )
        })
        .collect()
}

/// Short SMS text for a status update. `building` comes from the stored work order.
pub fn status_message(update: &StatusUpdate, building: &str) -> String {
    let wo = &update.wo_number;
    match update.new_status {
        CbreStatus::Escalation => {
            format!("ESCALATION: WO {wo} - {building} requires immediate attention!")
        }
        CbreStatus::QuoteRejected => {
            format!("QUOTE REJECTED: WO {wo} - {building}. Review needed.")
        }
        CbreStatus::Reassigned => {
            format!("REASSIGNED: WO {wo} - {building} has been reassigned by CBRE.")
        }
        CbreStatus::QuoteApproved => match update.approved_nte() {
            Some(nte) => format!("QUOTE APPROVED: WO {wo} - {building}. New NTE: ${nte:.2}"),
            None => format!("QUOTE APPROVED: WO {wo} - {building}"),
        },
        CbreStatus::InvoiceRejected => {
            format!("INVOICE REJECTED: WO {wo} - {building}. Review and resubmit needed.")
        }
        CbreStatus::Cancelled => {
            format!("CANCELLED: WO {wo} - {building} has been cancelled by CBRE.")
        }
        CbreStatus::QuoteSubmitted => {
            format!("CBRE Update: WO {wo} - Status: {}", update.new_status)
        }
    }
}
