//! Static description of a scraped source: where to fetch, how to extract,
//! how often to refresh and how to normalize what comes back.

use chrono::{FixedOffset, Offset, Utc};
use cron::Schedule;
use rg_core::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::extractor::ExtractionScript;

/// Refresh cadence of every source unless configured otherwise: daily at
/// midnight UTC, seconds field first.
pub const DEFAULT_CRON: &str = "0 0 0 * * *";

#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Unique key. Doubles as cache key and URL path segment.
    pub key: String,
    pub title: String,
    pub link: String,
    pub description: String,
    /// URL the extractor navigates to.
    pub target: String,
    pub script: ExtractionScript,
    pub cadence: Cadence,
    pub policy: NormalizationPolicy,
}

impl SourceDescriptor {
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }
}

#[derive(Clone)]
pub enum Cadence {
    Every(Duration),
    Cron { expr: String, schedule: Box<Schedule> },
}

impl Cadence {
    /// A fixed refresh period. Zero is rejected.
    pub fn every(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::Config("refresh period must be greater than zero".to_string()));
        }
        Ok(Cadence::Every(period))
    }

    /// Parses a cron expression. Five-field expressions get a `0` seconds
    /// field prepended.
    pub fn cron(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let normalized = if expr.split_whitespace().count() == 5 {
            format!("0 {}", expr)
        } else {
            expr.to_string()
        };
        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| Error::Config(format!("invalid cron expression `{}`: {}", expr, e)))?;
        Ok(Cadence::Cron {
            expr: normalized,
            schedule: Box::new(schedule),
        })
    }

    /// Time left until the next tick, measured from now.
    pub fn until_next(&self) -> Option<Duration> {
        match self {
            Cadence::Every(period) => Some(*period),
            Cadence::Cron { schedule, .. } => {
                let next = schedule.upcoming(Utc).next()?;
                Some((next - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            }
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::cron(DEFAULT_CRON).unwrap_or(Cadence::Every(Duration::from_secs(24 * 60 * 60)))
    }
}

impl fmt::Debug for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Every(period) => write!(f, "Every({:?})", period),
            Cadence::Cron { expr, .. } => write!(f, "Cron({})", expr),
        }
    }
}

/// Which raw fields feed which canonical fields, and how dates are read.
#[derive(Debug, Clone, Default)]
pub struct NormalizationPolicy {
    pub fields: FieldMap,
    pub dates: DatePolicy,
}

#[derive(Debug, Clone)]
pub struct FieldMap {
    pub title: String,
    pub link: String,
    pub description: String,
    pub date: String,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            link: "link".to_string(),
            description: "description".to_string(),
            date: "date".to_string(),
            author: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatePolicy {
    /// Tried in order; the first that parses wins.
    pub formats: Vec<DateFormat>,
    /// Offset assumed for dates that carry none.
    pub assume_offset: FixedOffset,
    /// Offset the canonical timestamp is rendered in.
    pub display_offset: FixedOffset,
}

impl Default for DatePolicy {
    fn default() -> Self {
        Self {
            formats: vec![DateFormat::Rfc3339, DateFormat::Rfc2822],
            assume_offset: utc_offset(),
            display_offset: utc_offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    Rfc3339,
    Rfc2822,
    /// Date and time without offset, chrono `strftime` syntax.
    Naive(String),
    /// Date only, read as midnight in the assumed offset.
    DateOnly(String),
}

pub(crate) fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cron_five_field_gets_seconds() {
        let cadence = Cadence::cron("0 0 * * *").unwrap();
        match cadence {
            Cadence::Cron { schedule, .. } => {
                let next = schedule.upcoming(Utc).next().unwrap();
                assert_eq!(next.format("%H:%M:%S").to_string(), "00:00:00");
            }
            other => panic!("unexpected cadence {:?}", other),
        }
    }

    #[test]
    fn test_cron_invalid() {
        let err = Cadence::cron("every tuesday").err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_cadence_is_daily_midnight() {
        let cadence = Cadence::default();
        assert!(matches!(cadence, Cadence::Cron { .. }));
        let wait = cadence.until_next().unwrap();
        assert!(wait <= Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_every_waits_full_period() {
        let cadence = Cadence::Every(Duration::from_secs(90));
        assert_eq!(cadence.until_next(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_every_rejects_zero_period() {
        assert!(matches!(Cadence::every(Duration::ZERO), Err(Error::Config(_))));
        assert!(matches!(
            Cadence::every(Duration::from_secs(1)),
            Ok(Cadence::Every(d)) if d == Duration::from_secs(1)
        ));
    }

    #[test]
    fn test_default_policy_is_utc() {
        let policy = NormalizationPolicy::default();
        assert_eq!(policy.dates.assume_offset.local_minus_utc(), 0);
        assert_eq!(policy.dates.display_offset.local_minus_utc(), 0);
        assert_eq!(policy.fields.title, "title");
        assert!(policy.fields.author.is_none());
    }
}
