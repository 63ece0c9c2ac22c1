//! Email interpretation: text normalization, field extraction, PM
//! classification, status-label interpretation, and `.eml` reading.

pub mod amount;
pub mod classify;
pub mod dispatch;
pub mod eml;
pub mod extract;
pub mod normalize;
pub mod status;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::ParseConfig;

/// Zone used when the configured one is not a known IANA name.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Per-call parse settings.
///
/// Built fresh for every parse (or batch) so no state is shared between calls.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Reference time: fallback for `date_entered` and the import stamp.
    pub now: DateTime<Utc>,
    /// Zone CBRE dates are written in when they carry no `UTC±HH` marker,
    /// and the zone the import stamp is rendered in.
    pub timezone: Tz,
    /// Label printed after the import stamp (e.g. `"EST"`).
    pub timezone_label: String,
    /// Maximum description length in characters.
    pub description_limit: usize,
    /// Maximum building length in characters.
    pub building_limit: usize,
    /// Drafts come from an operator-started import rather than the scheduled one.
    pub manual: bool,
}

impl ParseOptions {
    /// Options with built-in defaults and the current clock.
    pub fn now() -> Self {
        Self::from_config(&ParseConfig::default(), Utc::now())
    }

    /// Options from configuration, pinned to `now`.
    pub fn from_config(config: &ParseConfig, now: DateTime<Utc>) -> Self {
        let timezone = config.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                timezone = %config.timezone,
                "Unknown timezone in config, using America/New_York"
            );
            DEFAULT_TIMEZONE
        });
        Self {
            now,
            timezone,
            timezone_label: config.timezone_label.clone(),
            description_limit: config.description_limit,
            building_limit: config.building_limit,
            manual: false,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::now()
    }
}
