//! Dispatch path: one CBRE dispatch email in, one [`WorkOrderDraft`] out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::classify::{classify, DispatchKind};
use super::extract;
use super::normalize::normalize;
use super::ParseOptions;
use crate::model::email::RawEmail;
use crate::model::work_order::{Priority, Rejection, WorkOrderDraft, WorkOrderStatus};

/// Values a draft falls back to when the email does not supply them.
///
/// Built fresh for each parse from the caller's [`ParseOptions`].
#[derive(Debug, Clone)]
struct DraftDefaults {
    priority: Priority,
    date_entered: DateTime<Utc>,
    nte: Decimal,
    status: WorkOrderStatus,
}

impl DraftDefaults {
    fn new(options: &ParseOptions) -> Self {
        Self {
            priority: Priority::default(),
            date_entered: options.now,
            nte: Decimal::ZERO,
            status: WorkOrderStatus::Pending,
        }
    }
}

/// Optional facts that only appear in the audit comment.
#[derive(Debug, Default)]
struct CommentFacts<'a> {
    kind: Option<DispatchKind>,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    phone: &'a str,
    target_completion: Option<String>,
    asset_tag: Option<String>,
}

/// Parse a dispatch email.
pub fn parse_email(email: &RawEmail, options: &ParseOptions) -> Result<WorkOrderDraft, Rejection> {
    parse_dispatch(&email.subject, &email.body, options)
}

/// Parse a dispatch from its subject and raw body.
///
/// The only rejection is a missing work-order number; every other field
/// falls back to its default.
pub fn parse_dispatch(
    subject: &str,
    raw_body: &str,
    options: &ParseOptions,
) -> Result<WorkOrderDraft, Rejection> {
    let defaults = DraftDefaults::new(options);
    let body = normalize(raw_body);
    let kind = classify(subject, &body);

    let wo_number = extract::work_order_number(subject, &body)
        .filter(|wo| !wo.is_empty())
        .ok_or(Rejection::NoWorkOrderNumber)?;

    let priority = extract::priority(subject, &body).unwrap_or(defaults.priority);

    let date_entered = extract::date_entered(&body, options.timezone).unwrap_or_else(|| {
        debug!(wo = %wo_number, "No usable Date Entered, using parse time");
        defaults.date_entered
    });

    let building = extract::building(&body, options.building_limit).unwrap_or_default();
    let address = extract::address(&body).unwrap_or_default();
    let (city, state) = extract::location(&body).unwrap_or_default();
    let (requestor, requestor_phone) = extract::requestor(&body, kind)
        .map(|(name, phone)| (name, phone.unwrap_or_default()))
        .unwrap_or_default();
    let nte = extract::nte(&body).unwrap_or(defaults.nte);
    let description =
        extract::description(&body, kind, options.description_limit).unwrap_or_default();

    let comments = build_comments(
        &CommentFacts {
            kind: Some(kind),
            address: &address,
            city: &city,
            state: &state,
            phone: &requestor_phone,
            target_completion: extract::target_completion(&body),
            asset_tag: extract::asset_tag(&body),
        },
        options,
    );

    debug!(
        wo = %wo_number,
        pm = kind.is_pm(),
        priority = %priority,
        building = %building,
        "Parsed dispatch email"
    );

    Ok(WorkOrderDraft {
        wo_number,
        building,
        address,
        city,
        state,
        priority,
        date_entered,
        description,
        requestor,
        requestor_phone,
        nte,
        comments,
        status: defaults.status,
        is_pm: kind.is_pm(),
    })
}

/// Join the audit lines in fixed order, skipping absent facts.
fn build_comments(facts: &CommentFacts<'_>, options: &ParseOptions) -> String {
    let is_pm = facts.kind.is_some_and(DispatchKind::is_pm);
    let location = (!facts.city.is_empty() && !facts.state.is_empty())
        .then(|| format!("Location: {}, {}", facts.city, facts.state));

    let lines = [
        is_pm.then(|| "[PM - Preventive Maintenance]".to_string()),
        (!facts.address.is_empty()).then(|| format!("Address: {}", facts.address)),
        location,
        (!facts.phone.is_empty()).then(|| format!("Contact Phone: {}", facts.phone)),
        facts
            .target_completion
            .as_ref()
            .map(|t| format!("Target Completion: {t}")),
        facts.asset_tag.as_ref().map(|t| format!("Asset Tag: {t}")),
        Some(format!(
            "[{} from CBRE {}email on {} {}]",
            if options.manual { "Manually imported" } else { "Auto-imported" },
            if is_pm { "PM " } else { "" },
            import_stamp(options),
            options.timezone_label
        )),
    ];

    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

/// `1/5/2026, 2:48:00 PM` in the configured zone.
pub fn import_stamp(options: &ParseOptions) -> String {
    options
        .now
        .with_timezone(&options.timezone)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn options() -> ParseOptions {
        ParseOptions {
            now: Utc.with_ymd_and_hms(2026, 1, 5, 20, 0, 0).unwrap(),
            timezone: chrono_tz::America::New_York,
            timezone_label: "EST".to_string(),
            description_limit: 2000,
            building_limit: 200,
            manual: false,
        }
    }

    #[test]
    fn test_import_stamp() {
        assert_eq!(import_stamp(&options()), "1/5/2026, 3:00:00 PM");
    }

    #[test]
    fn test_import_stamp_in_summer() {
        let summer = ParseOptions::from_config(
            &crate::config::ParseConfig::default(),
            Utc.with_ymd_and_hms(2026, 7, 1, 16, 0, 0).unwrap(),
        );
        let draft = parse_dispatch("Work Order C1234567", "", &summer).unwrap();
        assert_eq!(
            draft.comments,
            "[Auto-imported from CBRE email on 7/1/2026, 12:00:00 PM EST]"
        );
    }

    #[test]
    fn test_manual_import_wording() {
        let manual = ParseOptions {
            manual: true,
            ..options()
        };
        let draft = parse_dispatch("PM Work Order P2919408", "", &manual).unwrap();
        assert!(draft
            .comments
            .ends_with("[Manually imported from CBRE PM email on 1/5/2026, 3:00:00 PM EST]"));
    }

    #[test]
    fn test_minimal_dispatch_uses_defaults() {
        let draft = parse_dispatch("Dispatch of Work Order C1234567", "", &options()).unwrap();
        assert_eq!(draft.wo_number, "C1234567");
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.date_entered, options().now);
        assert_eq!(draft.nte, Decimal::ZERO);
        assert_eq!(draft.status, WorkOrderStatus::Pending);
        assert!(draft.building.is_empty());
        assert!(!draft.is_pm);
        assert_eq!(
            draft.comments,
            "[Auto-imported from CBRE email on 1/5/2026, 3:00:00 PM EST]"
        );
    }

    #[test]
    fn test_no_work_order_rejected() {
        assert_eq!(
            parse_dispatch("Hello there", "<p>Nothing to dispatch</p>", &options()),
            Err(Rejection::NoWorkOrderNumber)
        );
    }

    #[test]
    fn test_comment_order_and_skipping() {
        let body = "Address: 1 MAIN ST, Country, St, City: US, GA, Atlanta Building: HQ Floor: 1 \
                    Target Completion: Jan 6 2026 2:48PM Tag Number: 42";
        let draft = parse_dispatch("PM Work Order P2919408", body, &options()).unwrap();
        assert!(draft.is_pm);
        assert_eq!(
            draft.comments,
            "[PM - Preventive Maintenance]\n\
             Address: 1 MAIN ST\n\
             Location: Atlanta, GA\n\
             Target Completion: Jan 6 2026\n\
             Asset Tag: 42\n\
             [Auto-imported from CBRE PM email on 1/5/2026, 3:00:00 PM EST]"
        );
    }

    #[test]
    fn test_location_line_needs_city_and_state() {
        let facts = CommentFacts {
            city: "Atlanta",
            ..Default::default()
        };
        let comments = build_comments(&facts, &options());
        assert!(!comments.contains("Location:"));
    }

    #[test]
    fn test_nte_and_priority() {
        let body = "Priority: P1 - Emergency Problem Description: Roof leak. \
                    This work should not exceed **2,500.00** USD";
        let draft = parse_dispatch("Work Order C7654321", body, &options()).unwrap();
        assert_eq!(draft.priority, Priority::Emergency);
        assert_eq!(draft.nte, dec!(2500.00));
        assert!(draft.description.starts_with("Roof leak."));
    }
}
