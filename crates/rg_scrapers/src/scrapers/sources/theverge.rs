use crate::extractor::{ExtractionScript, FieldRule};
use crate::source::{Cadence, DateFormat, DatePolicy, FieldMap, NormalizationPolicy, SourceDescriptor};

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        key: "theverge".to_string(),
        title: "The Verge".to_string(),
        link: "https://www.theverge.com/".to_string(),
        description: "Latest articles from The Verge".to_string(),
        target: "https://www.theverge.com/".to_string(),
        script: ExtractionScript::new(".duet--content-cards--content-card")
            .wait_for("#content")
            .field(FieldRule::text("title", "a").required())
            .field(FieldRule::href("link", "a"))
            .field(FieldRule::text("summary", ".p-dek"))
            .field(FieldRule::attr("date", ".duet--article--timestamp time", "datetime")),
        cadence: Cadence::default(),
        policy: NormalizationPolicy {
            fields: FieldMap {
                description: "summary".to_string(),
                ..FieldMap::default()
            },
            // Timestamps without an offset are UTC.
            dates: DatePolicy {
                formats: vec![
                    DateFormat::Rfc3339,
                    DateFormat::Naive("%Y-%m-%dT%H:%M:%S%.f".to_string()),
                ],
                ..DatePolicy::default()
            },
        },
    }
}
