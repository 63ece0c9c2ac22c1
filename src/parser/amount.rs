//! Dollar amounts in quote-approval and quote-submission emails.
//!
//! Each kind has an ordered list of phrasings. The body is searched before
//! the subject, and a number outside 100..=1,000,000 is treated as no match
//! (the search goes on), since document IDs and phone numbers often sit
//! right next to the keywords.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::extract::first_accepted;
use crate::model::status::AmountKind;

/// Smallest plausible NTE or quote.
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Largest plausible NTE or quote.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

static APPROVED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"approved\s+(?:for|amount[:\s]*)?[\s:]*\$?([\d,]+\.?\d*)",
        r"new\s+NTE[:\s]+(?:of\s+)?\$?([\d,]+\.?\d*)",
        r"NTE[:\s]+\$?([\d,]+\.?\d*)",
        r"increased\s+to\s+\$?([\d,]+\.?\d*)",
        r"total\s+(?:NTE|amount)[:\s]+\$?([\d,]+\.?\d*)",
        r"not\s+to\s+exceed\s+\$?([\d,]+\.?\d*)",
        r"NTE\s+has\s+been\s+(?:increased|approved|set)\s+to\s+\$?([\d,]+\.?\d*)",
        r"\$?([\d,]+\.?\d*)\s*USD\s*(?:approved|NTE)",
        r"approved[^$]*\$\s*([\d,]+\.?\d*)",
        r"quote\s+(?:of|for)\s+\$?([\d,]+\.?\d*)\s+(?:has\s+been\s+)?approved",
    ])
});

static SUBMITTED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"quote\s+(?:for|of|amount)?[:\s]*\$?([\d,]+\.?\d*)",
        r"submitted\s+(?:quote|for)?[:\s]*\$?([\d,]+\.?\d*)",
        r"requesting\s+\$?([\d,]+\.?\d*)",
        r"NTE\s+(?:increase|request)?\s+(?:to|of|for)?[:\s]*\$?([\d,]+\.?\d*)",
        r"total[:\s]+\$?([\d,]+\.?\d*)",
        r"amount[:\s]+\$?([\d,]+\.?\d*)",
        r"\$([\d,]+\.?\d*)\s*(?:quote|NTE|total)",
    ])
});

/// Parse `1,234.56`-style text. Thousands separators are dropped.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    let digits = digits.trim_end_matches('.');
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(digits).ok()
}

/// Whether `amount` could be a real NTE or quote.
pub fn is_plausible(amount: Decimal) -> bool {
    (MIN_AMOUNT..=MAX_AMOUNT).contains(&amount)
}

/// Extract an amount of the given kind from a normalized body, then the subject.
pub fn extract(kind: AmountKind, subject: &str, body: &str) -> Option<Decimal> {
    let patterns: Vec<&Regex> = match kind {
        AmountKind::ApprovedNte => APPROVED_PATTERNS.iter().collect(),
        AmountKind::SubmittedQuote => SUBMITTED_PATTERNS.iter().collect(),
    };
    first_accepted(&[body, subject], &patterns, |raw| {
        parse_amount(raw).filter(|amount| is_plausible(*amount))
    })
}

/// Approved NTE from a quote-approval email.
pub fn approved_nte(subject: &str, body: &str) -> Option<Decimal> {
    extract(AmountKind::ApprovedNte, subject, body)
}

/// Submitted quote amount from a quote-submitted email.
pub fn submitted_quote(subject: &str, body: &str) -> Option<Decimal> {
    extract(AmountKind::SubmittedQuote, subject, body)
}
