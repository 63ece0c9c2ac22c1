//! Integration tests for dispatch parsing, status interpretation and batch import.

use std::collections::HashSet;
use std::path::Path;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use dispatchmail::config::ImportConfig;
use dispatchmail::error::DispatchError;
use dispatchmail::import::{self, batch, sync};
use dispatchmail::model::email::RawEmail;
use dispatchmail::model::status::{AmountKind, BillingStatus, CbreStatus};
use dispatchmail::model::work_order::{Priority, Rejection, WorkOrderStatus};
use dispatchmail::notify;
use dispatchmail::parser::{amount, dispatch, eml, normalize, status, ParseOptions};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

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

// ─── Regular dispatch ───────────────────────────────────────────────

#[test]
fn test_regular_dispatch_fields() {
    let email = eml::read_eml(fixture("dispatch_regular.eml")).unwrap();
    let draft = dispatch::parse_email(&email, &options()).unwrap();

    assert_eq!(draft.wo_number, "C2959324");
    assert!(!draft.is_pm);
    assert_eq!(draft.priority, Priority::High);
    assert_eq!(
        draft.date_entered,
        Utc.with_ymd_and_hms(2026, 1, 5, 19, 48, 0).unwrap()
    );
    assert_eq!(draft.building, "SCCAE - WEST COLUMBIA AIR RAMP");
    assert_eq!(draft.address, "3400 EDMOND HWY, WEST COLUMBIA, SC, 29172");
    assert_eq!(draft.city, "West Columbia");
    assert_eq!(draft.state, "SC");
    assert_eq!(draft.requestor, "Lindsay Keck");
    assert_eq!(draft.requestor_phone, "971-940-6826");
    assert_eq!(draft.nte, dec!(1500.00));
    assert_eq!(draft.status, WorkOrderStatus::Pending);
    assert_eq!(
        draft.description,
        "Faulty Outlet or Switch - 747117: 10 outlets stop working located in the S203 and radio room"
    );
}

#[test]
fn test_regular_dispatch_comments() {
    let email = eml::read_eml(fixture("dispatch_regular.eml")).unwrap();
    let draft = dispatch::parse_email(&email, &options()).unwrap();

    assert_eq!(
        draft.comments,
        "Address: 3400 EDMOND HWY, WEST COLUMBIA, SC, 29172\n\
         Location: West Columbia, SC\n\
         Contact Phone: 971-940-6826\n\
         Target Completion: Jan 6 2026\n\
         [Auto-imported from CBRE email on 1/5/2026, 3:00:00 PM EST]"
    );
}

#[test]
fn test_draft_serializes_to_json() {
    let email = eml::read_eml(fixture("dispatch_regular.eml")).unwrap();
    let draft = dispatch::parse_email(&email, &options()).unwrap();
    let json = serde_json::to_value(&draft).unwrap();

    assert_eq!(json["wo_number"], "C2959324");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["nte"], "1500.00");
}

#[test]
fn test_plain_text_dispatch_keeps_raw_text() {
    let email = eml::read_eml(fixture("dispatch_plain.eml")).unwrap();
    assert!(!email.body.contains("&lt;"));

    let draft = dispatch::parse_email(&email, &options()).unwrap();
    assert_eq!(draft.wo_number, "C3011552");
    assert_eq!(draft.priority, Priority::Medium);
    assert_eq!(draft.building, "GAATL - ATLANTA HUB");
    assert_eq!(draft.requestor, "Sam O'Neil");
    assert_eq!(draft.description, "Replace & \"belt\" on AHU-3");
}

// ─── Preventive maintenance ─────────────────────────────────────────

#[test]
fn test_pm_dispatch_fields() {
    let email = eml::read_eml(fixture("dispatch_pm.eml")).unwrap();
    let draft = dispatch::parse_email(&email, &options()).unwrap();

    assert_eq!(draft.wo_number, "P2919408");
    assert!(draft.is_pm);
    assert_eq!(draft.priority, Priority::Medium);
    assert_eq!(draft.building, "NCCHA - CHARLOTTE HUB");
    assert_eq!(draft.requestor, "Adriana Davis");
    assert_eq!(draft.requestor_phone, "980-298-0331");
    assert_eq!(
        draft.description,
        "Replace filter\n\nPM Action: Replace all air handler filters and record the date on the unit."
    );
    assert!(draft.comments.starts_with("[PM - Preventive Maintenance]\n"));
    assert!(draft.comments.contains("Asset Tag: 887766"));
    assert!(draft
        .comments
        .ends_with("[Auto-imported from CBRE PM email on 1/5/2026, 3:00:00 PM EST]"));
}

#[test]
fn test_pm_subject_and_description() {
    let draft = dispatch::parse_dispatch(
        "Dispatch of PM Work Order P2919408",
        "<p>Preventive Maintenance Description: Replace filter</p>",
        &options(),
    )
    .unwrap();
    assert!(draft.is_pm);
    assert_eq!(draft.wo_number, "P2919408");
    assert!(draft.description.contains("Replace filter"));
}

// ─── Rejection and defaults ─────────────────────────────────────────

#[test]
fn test_non_dispatch_rejected() {
    let email = eml::read_eml(fixture("not_dispatch.eml")).unwrap();
    assert_eq!(
        dispatch::parse_email(&email, &options()),
        Err(Rejection::NoWorkOrderNumber)
    );
}

#[test]
fn test_work_order_number_any_case() {
    for subject in [
        "Dispatch of Work Order C2959324",
        "dispatch of WORK ORDER C2959324",
        "Dispatch_of_Work_Order_C2959324",
    ] {
        let draft = dispatch::parse_dispatch(subject, "", &options()).unwrap();
        assert_eq!(draft.wo_number, "C2959324", "subject: {subject}");
    }
}

#[test]
fn test_priority_defaults_to_medium() {
    let draft = dispatch::parse_dispatch("Work Order C1000001", "No marker here", &options()).unwrap();
    assert_eq!(draft.priority, Priority::Medium);
}

#[test]
fn test_priority_buckets() {
    let cases = [
        ("Priority: P1 - Emergency", Priority::Emergency),
        ("Priority: P3 - Emergency", Priority::Emergency),
        ("Priority: P2 - Urgent", Priority::High),
        ("Priority: P5 - 24 Hour Response", Priority::High),
        ("Priority: P4 - 72 Hour", Priority::Medium),
        ("Priority: P6 - 1 Month", Priority::Low),
    ];
    for (body, expected) in cases {
        let draft = dispatch::parse_dispatch("Work Order C1000001", body, &options()).unwrap();
        assert_eq!(draft.priority, expected, "body: {body}");
    }
}

#[test]
fn test_normalize_escapes_without_html() {
    assert_eq!(normalize::normalize("=3D=20=2F"), "= /");
}

#[test]
fn test_amount_plausibility() {
    assert_eq!(
        amount::extract(AmountKind::ApprovedNte, "", "Approved for $45"),
        None
    );
    assert_eq!(
        amount::extract(AmountKind::ApprovedNte, "", "Approved for $2,000,000"),
        None
    );
}

// ─── Status updates ─────────────────────────────────────────────────

#[test]
fn test_quote_approval_fixture() {
    let email = eml::read_eml(fixture("quote_approved.eml")).unwrap();
    let update = status::interpret("quote-approval", &email.subject, &email.body).unwrap();

    assert_eq!(update.wo_number, "C2926480");
    assert_eq!(update.new_status, CbreStatus::QuoteApproved);
    assert_eq!(update.billing_status, Some(BillingStatus::QuoteApproved));
    assert_eq!(update.approved_nte(), Some(dec!(2750.00)));
    assert!(update.should_notify());
    assert_eq!(
        notify::status_message(&update, "SCCAE"),
        "QUOTE APPROVED: WO C2926480 - SCCAE. New NTE: $2750.00"
    );
}

#[test]
fn test_quote_approval_amount() {
    let update = status::interpret(
        "quote-approval",
        "Work Order C2926480",
        "<p>Your quote was approved for $5,000.00 today.</p>",
    )
    .unwrap();
    assert_eq!(update.new_status, CbreStatus::QuoteApproved);
    assert_eq!(update.extracted_amount, Some(dec!(5000.00)));
}

#[test]
fn test_sync_rejects_unknown_label() {
    let email = eml::read_eml(fixture("quote_approved.eml")).unwrap();
    let report = sync::sync_statuses([("newsletter", &email)]);
    assert_eq!(report.processed, 1);
    assert!(report.updates.is_empty());
    assert_eq!(report.errors, vec!["unrecognized status label 'newsletter'"]);
}

// ─── Reading and batch import ───────────────────────────────────────

#[test]
fn test_read_missing_file() {
    let err = eml::read_eml(fixture("does_not_exist.eml")).unwrap_err();
    assert!(matches!(err, DispatchError::FileNotFound(_)));
}

#[test]
fn test_import_directory() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["dispatch_regular.eml", "dispatch_pm.eml", "not_dispatch.eml"] {
        std::fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }

    let emails = import::load_dir(dir.path(), &|_, _| {}).unwrap();
    assert_eq!(emails.len(), 3);

    let existing: HashSet<String> = ["P2919408".to_string()].into_iter().collect();
    let report = batch::import_batch(
        &emails,
        &existing,
        &options(),
        &ImportConfig::default(),
        false,
    );

    assert!(report.success);
    assert_eq!(report.imported, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.drafts[0].wo_number, "C2959324");
    assert_eq!(
        notify::import_subject(&report.drafts),
        "1 New Work Order Auto-Imported"
    );
}

#[test]
fn test_import_refuses_large_unattended_batch() {
    let emails: Vec<RawEmail> = (0..3)
        .map(|i| RawEmail::new(format!("Work Order C100000{i}"), ""))
        .collect();
    let config = ImportConfig { max_auto_import: 2 };

    let refused = batch::import_batch(&emails, &HashSet::new(), &options(), &config, false);
    assert!(!refused.success);
    assert_eq!(refused.imported, 0);

    let manual = batch::import_batch(&emails, &HashSet::new(), &options(), &config, true);
    assert!(manual.success);
    assert_eq!(manual.imported, 3);
}
