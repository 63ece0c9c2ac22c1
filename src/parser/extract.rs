//! Field extractors for CBRE dispatch emails.
//!
//! Each extractor is an independent pure function over the subject and the
//! [normalized](super::normalize::normalize) body. A miss returns `None`;
//! the [assembler](super::dispatch) decides what default to use. Patterns
//! that capture a value "up to the next label" stop at the first label that
//! follows instead of swallowing the rest of the body.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::amount::parse_amount;
use super::classify::DispatchKind;
use super::normalize::{squash, truncate_chars};
use crate::model::work_order::Priority;

// ── Regex patterns ──────────────────────────────────────────────────────

static RE_WO_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:PM[\s_]+)?Work[\s_]+Order[\s_]+([A-Z]?[0-9]+)").unwrap()
});

static RE_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Priority[:\s_]*(P\d+)[\s\-_]*([^<\n:]*)").unwrap()
});

static RE_DATE_ENTERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Date Entered:\s*([A-Za-z]+\s+\d+\s+\d+\s+[\d:]+\s*[AP]?M?)(?:\s*UTC\s*([+-])(\d{1,2})(?::?(\d{2}))?)?",
    )
    .unwrap()
});

static RE_BUILDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Building:\s*([^<\n]+?)\s*(?:Floor|Area|Country|$)").unwrap()
});

static RE_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Address:\s*([^<\n]+?)\s*(?:Country|Building|$)").unwrap()
});

static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Country,?\s*St,?\s*City[:\s]*(?:USA?),?\s*([A-Z]{2}),?\s*([A-Za-z][A-Za-z ]*?)\s*(?:\b(?:Building|Floor|Area)\b|[^A-Za-z ]|$)",
    )
    .unwrap()
});

static RE_REQUESTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Work Order Requestor Name and Phone:\s*([^,<\n]+),?\s*([\d\-\(\)\s]+)?")
        .unwrap()
});

static RE_SITE_CONTACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)UPS Site Contact:\s*([^(<\n]+?)\s*\(?(\d[\d\-]*)\)?").unwrap()
});

static RE_NTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)should not exceed\s*\*{0,2}\s*([\d,]+\.?\d*)\s*\*{0,2}\s*USD").unwrap()
});

static RE_PROBLEM_DESC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)Problem Description:\s*(.*?)\s*(?:Assignment Name|Notes to Vendor|Service Location|$)",
    )
    .unwrap()
});

static RE_PM_DESC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)Preventive Maintenance Description:\s*(.*?)\s*(?:Service Location|Asset|PM Action|$)",
    )
    .unwrap()
});

static RE_PM_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)PM Action Steps:\s*-*\s*(.*?)\s*(?:If you have any questions|Assignment Name|$)",
    )
    .unwrap()
});

static RE_TARGET_COMPLETION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Target Completion:\s*([A-Za-z]+\s+\d+\s+\d+)").unwrap()
});

static RE_ASSET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Tag Number:\s*(\d+)").unwrap());

static RE_DOUBLE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*,").unwrap());

static RE_TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*$").unwrap());

static RE_NON_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d\-]").unwrap());

/// Date layouts CBRE uses after `Date Entered:` (whitespace already collapsed).
const DATE_FORMATS: &[&str] = &[
    "%b %d %Y %I:%M%p",
    "%b %d %Y %I:%M %p",
    "%b %d %Y %I:%M:%S%p",
    "%b %d %Y %I:%M:%S %p",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%B %d %Y %I:%M%p",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %H:%M",
];

// ── Combinator ──────────────────────────────────────────────────────────

/// Try every pattern against every haystack, in order, and return the first
/// capture that `accept` turns into a value.
///
/// Haystacks form the outer loop: all patterns are tried on the first
/// haystack before moving to the next.
pub(crate) fn first_accepted<T>(
    haystacks: &[&str],
    patterns: &[&Regex],
    accept: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    haystacks.iter().find_map(|haystack| {
        patterns.iter().find_map(|re| {
            re.captures(haystack)
                .and_then(|caps| caps.get(1))
                .and_then(|m| accept(m.as_str()))
        })
    })
}

/// First capture group of `re` in `haystack`, trimmed, if non-empty.
fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

// ── Extractors ──────────────────────────────────────────────────────────

/// Work-order number from the subject, falling back to the body.
///
/// Accepts `Work Order C2959324`, `PM Work Order P2919408` and the
/// underscore-folded `Dispatch_of_Work_Order_C2959324`.
pub fn work_order_number(subject: &str, body: &str) -> Option<String> {
    first_accepted(&[subject, body], &[&RE_WO_NUMBER], |wo| {
        Some(wo.to_string())
    })
}

/// Priority bucket from the body, falling back to the subject.
///
/// Returns `None` when neither carries a `Priority: Pn` marker.
pub fn priority(subject: &str, body: &str) -> Option<Priority> {
    let caps = RE_PRIORITY
        .captures(body)
        .or_else(|| RE_PRIORITY.captures(subject))?;
    let code = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    Some(classify_priority(code, text))
}

/// Map a priority code (`P1`…) and its free text to a bucket.
///
/// First rule that matches wins:
/// - `P1` or "emergency" → emergency
/// - `P2`, "urgent" or "24 hour" → high
/// - `P3`, `P4`, "48 hour" or "72 hour" → medium
/// - anything else (`P5`+, "1 week", "1 month") → low
///
/// [`priority`] passes `text` only up to the next `:`, not to the end of the
/// line. A normalized body is a single line, so the longer capture would let
/// words from later fields ("emergency lights out") decide the bucket.
pub fn classify_priority(code: &str, text: &str) -> Priority {
    let number = code
        .trim()
        .get(1..)
        .and_then(|digits| digits.parse::<u32>().ok());
    let text = text.to_lowercase();

    if number == Some(1) || text.contains("emergency") {
        Priority::Emergency
    } else if number == Some(2) || text.contains("urgent") || text.contains("24 hour") {
        Priority::High
    } else if matches!(number, Some(3) | Some(4))
        || text.contains("48 hour")
        || text.contains("72 hour")
    {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// `Date Entered:` timestamp.
///
/// A trailing `UTC-05` marker sets the offset; otherwise the wall-clock time
/// is read in `zone`, daylight saving included. Invalid dates, and local
/// times that fall in a spring-forward gap, yield `None`.
pub fn date_entered(body: &str, zone: Tz) -> Option<DateTime<Utc>> {
    let caps = RE_DATE_ENTERED.captures(body)?;
    let raw = squash(caps.get(1)?.as_str());

    let marker = match (caps.get(2), caps.get(3)) {
        (Some(sign), Some(hours)) => {
            let hours: i32 = hours.as_str().parse().ok()?;
            let minutes: i32 = caps
                .get(4)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            let seconds = hours * 3600 + minutes * 60;
            FixedOffset::east_opt(if sign.as_str() == "-" { -seconds } else { seconds })
        }
        _ => None,
    };

    let Some(naive) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
    else {
        debug!(date = %raw, "Unparseable Date Entered");
        return None;
    };

    match marker {
        Some(offset) => in_zone(&offset, naive),
        None => in_zone(&zone, naive),
    }
}

/// Earliest instant a wall-clock time maps to in `zone`.
fn in_zone<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Building name, bounded by the next `Floor`/`Area`/`Country` label.
pub fn building(body: &str, limit: usize) -> Option<String> {
    capture(&RE_BUILDING, body).map(|b| truncate_chars(&b, limit))
}

/// Street address, bounded by the next `Country`/`Building` label, with
/// empty comma-separated parts and the trailing comma removed.
pub fn address(body: &str) -> Option<String> {
    let raw = capture(&RE_ADDRESS, body)?;
    let cleaned = RE_DOUBLE_COMMA.replace_all(&raw, ",");
    let cleaned = RE_TRAILING_COMMA.replace(&cleaned, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// `(city, state)` from the `Country, St, City: US, SC, West Columbia` line.
pub fn location(body: &str) -> Option<(String, String)> {
    let caps = RE_LOCATION.captures(body)?;
    let state = caps.get(1)?.as_str().trim().to_uppercase();
    let city = caps.get(2)?.as_str().trim().to_string();
    if city.is_empty() {
        return None;
    }
    Some((city, state))
}

/// Requestor name and, when present, phone (digits and dashes only).
///
/// Regular dispatches use `Work Order Requestor Name and Phone: NAME, PHONE`;
/// PM dispatches use `UPS Site Contact: NAME (PHONE) email`. The variant
/// matching `kind` is tried first and only one of them ever fires.
pub fn requestor(body: &str, kind: DispatchKind) -> Option<(String, Option<String>)> {
    let variants: [&Regex; 2] = match kind {
        DispatchKind::Regular => [&RE_REQUESTOR, &RE_SITE_CONTACT],
        DispatchKind::PreventiveMaintenance => [&RE_SITE_CONTACT, &RE_REQUESTOR],
    };

    variants.iter().find_map(|re| {
        let caps = re.captures(body)?;
        let name = caps.get(1)?.as_str().trim().to_string();
        if name.is_empty() {
            return None;
        }
        let phone = caps
            .get(2)
            .map(|m| RE_NON_PHONE.replace_all(m.as_str(), "").trim().to_string())
            .filter(|p| !p.is_empty());
        Some((name, phone))
    })
}

/// Not-to-exceed amount from `should not exceed **1,500.00** USD`.
pub fn nte(body: &str) -> Option<Decimal> {
    let raw = RE_NTE.captures(body)?.get(1)?.as_str().to_string();
    parse_amount(&raw)
}

/// Problem or PM description, with `PM Action Steps` appended when they add
/// something, truncated to `limit` characters.
pub fn description(body: &str, kind: DispatchKind, limit: usize) -> Option<String> {
    let variants: [&Regex; 2] = match kind {
        DispatchKind::Regular => [&RE_PROBLEM_DESC, &RE_PM_DESC],
        DispatchKind::PreventiveMaintenance => [&RE_PM_DESC, &RE_PROBLEM_DESC],
    };

    let mut description = variants
        .iter()
        .find_map(|re| capture(re, body).map(|d| squash(&d)))
        .unwrap_or_default();

    if let Some(action) = capture(&RE_PM_ACTION, body).map(|a| squash(&a)) {
        if !description.contains(&action) {
            description = if description.is_empty() {
                action
            } else {
                format!("{description}\n\nPM Action: {action}")
            };
        }
    }

    let description = truncate_chars(&description, limit);
    (!description.is_empty()).then_some(description)
}

/// `Target Completion:` date as written (`Jan 6 2026`).
pub fn target_completion(body: &str) -> Option<String> {
    capture(&RE_TARGET_COMPLETION, body).map(|t| squash(&t))
}

/// Asset `Tag Number:` of PM dispatches.
pub fn asset_tag(body: &str) -> Option<String> {
    capture(&RE_ASSET_TAG, body)
}
