//! Raw record to canonical record, driven entirely by a source's
//! [`NormalizationPolicy`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rg_core::{CanonicalRecord, RawRecord};
use tracing::warn;
use url::Url;

use crate::source::{DateFormat, DatePolicy, NormalizationPolicy};

/// Builds the canonical record for one raw item. Never fails: a date that
/// cannot be read degrades to `now`.
pub fn normalize(policy: &NormalizationPolicy, raw: &RawRecord, now: DateTime<Utc>) -> CanonicalRecord {
    let fields = &policy.fields;
    let link = raw.get(&fields.link).to_string();
    let raw_date = raw.get(&fields.date).trim();

    let published = if raw_date.is_empty() {
        now.fixed_offset()
    } else {
        match parse_date(&policy.dates, raw_date) {
            Some(parsed) => parsed,
            None => {
                warn!(date = raw_date, link = %link, "Unparseable date, using generation time");
                now.fixed_offset()
            }
        }
    };

    CanonicalRecord {
        title: raw.get(&fields.title).to_string(),
        identifier: derive_identifier(&link),
        link,
        description: raw.get(&fields.description).to_string(),
        published: published
            .with_timezone(&policy.dates.display_offset)
            .to_rfc2822(),
        author: optional_field(raw, fields.author.as_deref()),
        category: optional_field(raw, fields.category.as_deref()),
    }
}

/// Parses `link` as a URL and renders it back. Text that is not a URL is
/// returned unchanged, so the result depends on the link alone.
pub fn derive_identifier(link: &str) -> String {
    Url::parse(link)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| link.to_string())
}

/// Tries each configured format in order.
pub fn parse_date(policy: &DatePolicy, raw: &str) -> Option<DateTime<FixedOffset>> {
    policy
        .formats
        .iter()
        .find_map(|format| parse_with(format, policy.assume_offset, raw))
}

fn parse_with(format: &DateFormat, assume: FixedOffset, raw: &str) -> Option<DateTime<FixedOffset>> {
    match format {
        DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(raw).ok(),
        DateFormat::Rfc2822 => DateTime::parse_from_rfc2822(raw).ok(),
        DateFormat::Naive(pattern) => {
            let naive = NaiveDateTime::parse_from_str(raw, pattern).ok()?;
            assume.from_local_datetime(&naive).single()
        }
        DateFormat::DateOnly(pattern) => {
            let naive = NaiveDate::parse_from_str(raw, pattern).ok()?.and_hms_opt(0, 0, 0)?;
            assume.from_local_datetime(&naive).single()
        }
    }
}

fn optional_field(raw: &RawRecord, field: Option<&str>) -> Option<String> {
    field
        .map(|name| raw.get(name).trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
