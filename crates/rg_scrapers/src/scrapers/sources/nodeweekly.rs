use crate::extractor::{ExtractionScript, FieldRule};
use crate::source::{Cadence, DateFormat, DatePolicy, NormalizationPolicy, SourceDescriptor};

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        key: "nodeweekly".to_string(),
        title: "Node Weekly".to_string(),
        link: "https://nodeweekly.com/".to_string(),
        description: "A free, once–weekly round-up of Node.js news and articles.".to_string(),
        target: "https://nodeweekly.com/issues".to_string(),
        // The issue date is the text node right after the issue link, behind a dash.
        script: ExtractionScript::new(".issues .issue")
            .wait_for(".contained")
            .field(FieldRule::text("title", "a").required())
            .field(FieldRule::href("link", "a"))
            .field(FieldRule::next_text("date", "a").strip_prefix("—")),
        cadence: Cadence::default(),
        policy: NormalizationPolicy {
            dates: DatePolicy {
                formats: vec![
                    DateFormat::DateOnly("%B %d, %Y".to_string()),
                    DateFormat::Rfc2822,
                ],
                ..DatePolicy::default()
            },
            ..NormalizationPolicy::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_records;
    use crate::normalize::normalize;
    use chrono::{TimeZone, Utc};

    const PAGE: &str = r#"
        <div class="contained">
          <div class="issues">
            <div class="issue"><a href="/issues/500">Issue #500</a> — October 24, 2023</div>
            <div class="issue"><a href="/issues/499">Issue #499</a></div>
          </div>
        </div>
    "#;

    #[test]
    fn test_date_from_following_text() {
        let d = descriptor();
        let raw = extract_records(PAGE, &d.target, &d.script).unwrap();
        assert_eq!(raw.len(), 2);

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let first = normalize(&d.policy, &raw[0], now);
        assert_eq!(first.title, "Issue #500");
        assert_eq!(first.link, "https://nodeweekly.com/issues/500");
        assert_eq!(first.identifier, first.link);
        assert_eq!(first.published, "Tue, 24 Oct 2023 00:00:00 +0000");

        let second = normalize(&d.policy, &raw[1], now);
        assert_eq!(second.published, now.to_rfc2822());
        assert_eq!(second.description, "");
    }
}
