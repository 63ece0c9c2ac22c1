//! Regular vs. Preventive-Maintenance dispatch classification.

/// Kind of dispatch email. Selects extractor variants and the PM comment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Regular,
    PreventiveMaintenance,
}

impl DispatchKind {
    pub fn is_pm(self) -> bool {
        self == Self::PreventiveMaintenance
    }
}

/// Classify a dispatch from its subject and (raw or normalized) body.
///
/// PM when the subject says "PM Work Order" or the body has a
/// "Preventive Maintenance Description", case-insensitively.
pub fn classify(subject: &str, body: &str) -> DispatchKind {
    let subject = subject.to_lowercase().replace('_', " ");
    if subject.contains("pm work order")
        || body
            .to_lowercase()
            .contains("preventive maintenance description")
    {
        DispatchKind::PreventiveMaintenance
    } else {
        DispatchKind::Regular
    }
}

/// Shorthand for `classify(..).is_pm()`.
pub fn is_pm(subject: &str, body: &str) -> bool {
    classify(subject, body).is_pm()
}
