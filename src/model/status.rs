//! Status updates produced by the label-driven path.

use rust_decimal::Decimal;

/// CBRE-side status a work order moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CbreStatus {
    Escalation,
    QuoteApproved,
    QuoteRejected,
    QuoteSubmitted,
    Reassigned,
    InvoiceRejected,
    Cancelled,
}

impl CbreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escalation => "escalation",
            Self::QuoteApproved => "quote_approved",
            Self::QuoteRejected => "quote_rejected",
            Self::QuoteSubmitted => "quote_submitted",
            Self::Reassigned => "reassigned",
            Self::InvoiceRejected => "invoice_rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CbreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing status that accompanies some transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    QuoteApproved,
    Quoted,
}

/// Status applied to the latest invoice of the work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Rejected,
}

/// Which dollar amount a label asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    /// The new not-to-exceed approved by CBRE. Replaces the stored NTE.
    ApprovedNte,
    /// A quote we submitted. Tracked only, never applied to the NTE.
    SubmittedQuote,
}

/// One status transition for an already-stored work order, looked up by number.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusUpdate {
    pub wo_number: String,
    pub new_status: CbreStatus,

    /// Amount found in the email, always within the plausible range.
    pub extracted_amount: Option<Decimal>,

    /// What `extracted_amount` means; `None` when the label extracts nothing.
    pub amount_kind: Option<AmountKind>,

    /// Label as received (lowercased).
    pub source_label: String,

    /// Subject of the email that triggered the update.
    pub subject: String,

    pub billing_status: Option<BillingStatus>,
    pub invoice_status: Option<InvoiceStatus>,

    /// Whether the label itself asks for office staff to be alerted.
    pub notify: bool,
}

impl StatusUpdate {
    /// The approved NTE, if this update carries one.
    pub fn approved_nte(&self) -> Option<Decimal> {
        match self.amount_kind {
            Some(AmountKind::ApprovedNte) => self.extracted_amount,
            _ => None,
        }
    }

    /// The submitted quote amount, if this update carries one.
    pub fn submitted_quote(&self) -> Option<Decimal> {
        match self.amount_kind {
            Some(AmountKind::SubmittedQuote) => self.extracted_amount,
            _ => None,
        }
    }

    /// Notify when the label asks for it, and also whenever a new NTE was approved.
    pub fn should_notify(&self) -> bool {
        self.notify || self.approved_nte().is_some()
    }

    /// Audit comment appended to the stored work order's comments.
    ///
    /// `stamp` is the pre-formatted time of the sync; `previous_nte` is the
    /// NTE currently stored, shown next to an approved replacement.
    pub fn comment(&self, stamp: &str, previous_nte: Option<Decimal>) -> String {
        let mut out = format!(
            "[CBRE {}] {}\nEmail: {}",
            self.new_status.as_str().to_uppercase(),
            stamp,
            self.subject
        );
        if let Some(nte) = self.approved_nte() {
            out.push_str(&format!(
                "\nNTE Updated: {:.2} -> {:.2}",
                previous_nte.unwrap_or(Decimal::ZERO),
                nte
            ));
        }
        if let Some(quote) = self.submitted_quote() {
            out.push_str(&format!("\nQuote Submitted: {quote:.2}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn update(status: CbreStatus, amount: Option<Decimal>, kind: Option<AmountKind>) -> StatusUpdate {
        StatusUpdate {
            wo_number: "C2926480".into(),
            new_status: status,
            extracted_amount: amount,
            amount_kind: kind,
            source_label: "test".into(),
            subject: "Quote update for Work Order C2926480".into(),
            billing_status: None,
            invoice_status: None,
            notify: false,
        }
    }

    #[test]
    fn test_comment_with_approved_nte() {
        let u = update(
            CbreStatus::QuoteApproved,
            Some(dec!(5000)),
            Some(AmountKind::ApprovedNte),
        );
        let c = u.comment("1/5/2026, 2:48:00 PM", Some(dec!(1500)));
        assert_eq!(
            c,
            "[CBRE QUOTE_APPROVED] 1/5/2026, 2:48:00 PM\n\
             Email: Quote update for Work Order C2926480\n\
             NTE Updated: 1500.00 -> 5000.00"
        );
    }

    #[test]
    fn test_comment_with_submitted_quote() {
        let u = update(
            CbreStatus::QuoteSubmitted,
            Some(dec!(1234.5)),
            Some(AmountKind::SubmittedQuote),
        );
        let c = u.comment("now", None);
        assert!(c.starts_with("[CBRE QUOTE_SUBMITTED] now"));
        assert!(c.ends_with("Quote Submitted: 1234.50"));
        assert!(!c.contains("NTE Updated"));
    }

    #[test]
    fn test_should_notify_on_approved_nte() {
        let silent = update(CbreStatus::QuoteApproved, None, Some(AmountKind::ApprovedNte));
        assert!(!silent.should_notify());

        let approved = update(
            CbreStatus::QuoteApproved,
            Some(dec!(900)),
            Some(AmountKind::ApprovedNte),
        );
        assert!(approved.should_notify());

        let quoted = update(
            CbreStatus::QuoteSubmitted,
            Some(dec!(900)),
            Some(AmountKind::SubmittedQuote),
        );
        assert!(!quoted.should_notify());
    }
}
