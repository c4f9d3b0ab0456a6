use chrono::FixedOffset;

use crate::extractor::{ExtractionScript, FieldRule};
use crate::source::{Cadence, DateFormat, DatePolicy, FieldMap, NormalizationPolicy, SourceDescriptor};

/// freeCodeCamp feeds are rendered at UTC+9.
const DISPLAY_OFFSET_SECS: i32 = 9 * 3600;

pub fn descriptor() -> SourceDescriptor {
    let mut dates = DatePolicy {
        formats: vec![DateFormat::Rfc3339],
        ..DatePolicy::default()
    };
    if let Some(offset) = FixedOffset::east_opt(DISPLAY_OFFSET_SECS) {
        dates.display_offset = offset;
    }

    SourceDescriptor {
        key: "freecodecamp".to_string(),
        title: "freeCodeCamp".to_string(),
        link: "https://www.freecodecamp.org/news/".to_string(),
        description: "Latest articles from freeCodeCamp".to_string(),
        target: "https://www.freecodecamp.org/news/".to_string(),
        script: ExtractionScript::new(".post-feed .post-card")
            .wait_for(".post-feed")
            .field(FieldRule::text("title", "h2 a").required())
            .field(FieldRule::href("link", "h2 a"))
            .field(FieldRule::text("tag", ".post-card-tags a"))
            .field(FieldRule::attr("date", "time", "datetime")),
        cadence: Cadence::default(),
        policy: NormalizationPolicy {
            fields: FieldMap {
                description: "tag".to_string(),
                ..FieldMap::default()
            },
            dates,
        },
    }
}
