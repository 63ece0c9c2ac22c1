//! Status-update interpretation, keyed by mailbox label rather than content.
//!
//! CBRE sends follow-up notices (escalations, quote decisions, cancellations)
//! that a mail rule files under a label. The label decides the transition;
//! the content only supplies the work-order number and, for quote labels, a
//! dollar amount.

use std::sync::LazyLock;

use regex::Regex;

use super::amount;
use super::extract::first_accepted;
use super::normalize::normalize;
use crate::model::status::{AmountKind, BillingStatus, CbreStatus, InvoiceStatus, StatusUpdate};
use crate::model::work_order::Rejection;

/// What a label means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRule {
    pub label: &'static str,
    pub status: CbreStatus,
    pub billing: Option<BillingStatus>,
    pub invoice: Option<InvoiceStatus>,
    pub notify: bool,
    pub amount: Option<AmountKind>,
}

/// All recognized labels.
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        label: "escalation",
        status: CbreStatus::Escalation,
        billing: None,
        invoice: None,
        notify: true,
        amount: None,
    },
    LabelRule {
        label: "quote-approval",
        status: CbreStatus::QuoteApproved,
        billing: Some(BillingStatus::QuoteApproved),
        invoice: None,
        notify: false,
        amount: Some(AmountKind::ApprovedNte),
    },
    LabelRule {
        label: "quote-rejected",
        status: CbreStatus::QuoteRejected,
        billing: None,
        invoice: None,
        notify: true,
        amount: None,
    },
    LabelRule {
        label: "quote-submitted",
        status: CbreStatus::QuoteSubmitted,
        billing: Some(BillingStatus::Quoted),
        invoice: None,
        notify: false,
        amount: Some(AmountKind::SubmittedQuote),
    },
    LabelRule {
        label: "reassignment-of",
        status: CbreStatus::Reassigned,
        billing: None,
        invoice: None,
        notify: true,
        amount: None,
    },
    LabelRule {
        label: "invoice-rejected",
        status: CbreStatus::InvoiceRejected,
        billing: None,
        invoice: Some(InvoiceStatus::Rejected),
        notify: true,
        amount: None,
    },
    LabelRule {
        label: "cancellation",
        status: CbreStatus::Cancelled,
        billing: None,
        invoice: None,
        notify: true,
        amount: None,
    },
];

// `Work Order C2926480`, `WO# ST2652325`, a bare `C2926480`, a bare `2926480`.
// Digits are ASCII only.
// The bare forms are case-sensitive so ordinary words never qualify.
static WO_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)Work Order\s+([A-Z]{0,2}[0-9]{6,})").unwrap(),
        Regex::new(r"(?i)WO#?\s*([A-Z]{0,2}[0-9]{6,})").unwrap(),
        Regex::new(r"\b([A-Z]{1,2}[0-9]{6,})\b").unwrap(),
        Regex::new(r"\b([0-9]{7,})\b").unwrap(),
    ]
});

/// Look up a label, ignoring case and surrounding whitespace.
pub fn rule_for(label: &str) -> Option<&'static LabelRule> {
    let label = label.trim().to_lowercase();
    LABEL_RULES.iter().find(|rule| rule.label == label)
}

/// Work-order number of a status email: subject first, then normalized body.
pub fn work_order_number(subject: &str, normalized_body: &str) -> Option<String> {
    let patterns: Vec<&Regex> = WO_PATTERNS.iter().collect();
    first_accepted(&[subject, normalized_body], &patterns, |wo| {
        Some(wo.to_string())
    })
}

/// Interpret one labeled email.
///
/// Unknown labels and emails without a work-order number are rejected.
pub fn interpret(label: &str, subject: &str, body: &str) -> Result<StatusUpdate, Rejection> {
    let rule = rule_for(label).ok_or_else(|| Rejection::UnknownLabel(label.trim().to_string()))?;

    let body = normalize(body);
    let wo_number = work_order_number(subject, &body).ok_or(Rejection::NoWorkOrderNumber)?;

    let extracted_amount = rule
        .amount
        .and_then(|kind| amount::extract(kind, subject, &body));

    tracing::debug!(
        wo = %wo_number,
        label = rule.label,
        status = %rule.status,
        amount = ?extracted_amount,
        "Interpreted status email"
    );

    Ok(StatusUpdate {
        wo_number,
        new_status: rule.status,
        extracted_amount,
        amount_kind: rule.amount,
        source_label: rule.label.to_string(),
        subject: subject.to_string(),
        billing_status: rule.billing,
        invoice_status: rule.invoice,
        notify: rule.notify,
    })
}
