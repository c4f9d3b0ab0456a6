use crate::extractor::{ExtractionScript, FieldRule};
use crate::source::{Cadence, DateFormat, DatePolicy, FieldMap, NormalizationPolicy, SourceDescriptor};

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        key: "css-tricks".to_string(),
        title: "CSS-Tricks".to_string(),
        link: "https://css-tricks.com/".to_string(),
        description: "Latest articles from CSS-Tricks".to_string(),
        target: "https://css-tricks.com/".to_string(),
        script: ExtractionScript::new(".latest-articles .article-card")
            .wait_for(".latest-articles")
            .field(FieldRule::text("title", "h2 a").required())
            .field(FieldRule::href("link", "h2 a"))
            .field(FieldRule::text("description", ".article-content"))
            .field(FieldRule::text("author", ".author-row .author-name"))
            .field(FieldRule::text("date", "time"))
            .field(FieldRule::text("tags", ".tags a[rel=\"tag\"]").join(", ")),
        cadence: Cadence::default(),
        policy: NormalizationPolicy {
            fields: FieldMap {
                author: Some("author".to_string()),
                category: Some("tags".to_string()),
                ..FieldMap::default()
            },
            dates: DatePolicy {
                formats: vec![
                    DateFormat::DateOnly("%b %d, %Y".to_string()),
                    DateFormat::DateOnly("%B %d, %Y".to_string()),
                    DateFormat::Rfc3339,
                ],
                ..DatePolicy::default()
            },
        },
    }
}
