use crate::extractor::{ExtractionScript, FieldRule};
use crate::source::{Cadence, DateFormat, DatePolicy, FieldMap, NormalizationPolicy, SourceDescriptor};

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        key: "aws".to_string(),
        title: "AWS Blogs".to_string(),
        link: "https://aws.amazon.com/blogs/".to_string(),
        description: "Latest articles from AWS Blogs".to_string(),
        target: "https://aws.amazon.com/blogs".to_string(),
        // The info line reads "by <author>, on <date>".
        script: ExtractionScript::new(".aws-directories-container .m-card.m-list-card")
            .wait_for(".aws-directories-container-wrapper")
            .header("Accept-Language", "en-US,en;q=0.9")
            .field(FieldRule::text("title", ".m-card-title a").required())
            .field(FieldRule::href("link", ".m-card-title a"))
            .field(FieldRule::text("description", ".m-card-description"))
            .field(FieldRule::text("author", ".m-card-info").split(",", 0).strip_prefix("by"))
            .field(FieldRule::text("date", ".m-card-info").split(",", 1).strip_prefix("on")),
        cadence: Cadence::default(),
        policy: NormalizationPolicy {
            fields: FieldMap {
                author: Some("author".to_string()),
                ..FieldMap::default()
            },
            dates: DatePolicy {
                formats: vec![
                    DateFormat::DateOnly("%d %b %Y".to_string()),
                    DateFormat::Rfc2822,
                    DateFormat::Rfc3339,
                ],
                ..DatePolicy::default()
            },
        },
    }
}
