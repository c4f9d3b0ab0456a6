//! Fetching a source page and turning it into raw records.
//!
//! An [`ExtractionScript`] is a declarative list of CSS selectors: one
//! selector picks the item containers, and each [`FieldRule`] says where
//! inside an item a field's text lives. Callers outside this module treat
//! scripts as opaque.

use async_trait::async_trait;
use rg_core::{Error, RawRecord, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("rss-generator/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Navigates to `target`, runs `script` against it and returns the
    /// records in document order.
    async fn extract(&self, target: &str, script: &ExtractionScript) -> Result<Vec<RawRecord>>;
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionScript {
    /// Selector that must match before extraction proceeds.
    pub wait_for: Option<String>,
    /// Selector matching one element per item.
    pub items: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    pub fields: Vec<FieldRule>,
}

impl ExtractionScript {
    pub fn new(items: impl Into<String>) -> Self {
        Self {
            items: items.into(),
            ..Default::default()
        }
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Whitespace-collapsed text content.
    Text,
    Attr(String),
    /// Attribute holding a URL, resolved against the target.
    Href(String),
    /// The text node right after the matched element.
    NextText,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    /// Sub-selector inside the item; `None` reads the item element itself.
    pub selector: Option<String>,
    pub source: ValueSource,
    /// Split on the delimiter and keep the part at the index.
    pub split: Option<(String, usize)>,
    pub strip_prefix: Option<String>,
    pub strip_suffix: Option<String>,
    /// Join every match with this separator instead of taking the first.
    pub join: Option<String>,
    /// Items without a value for a required field are dropped.
    pub required: bool,
}

impl FieldRule {
    fn new(name: impl Into<String>, selector: Option<String>, source: ValueSource) -> Self {
        Self {
            name: name.into(),
            selector,
            source,
            split: None,
            strip_prefix: None,
            strip_suffix: None,
            join: None,
            required: false,
        }
    }

    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Some(selector.into()), ValueSource::Text)
    }

    pub fn attr(name: impl Into<String>, selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::new(name, Some(selector.into()), ValueSource::Attr(attr.into()))
    }

    pub fn href(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Some(selector.into()), ValueSource::Href("href".to_string()))
    }

    pub fn next_text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Some(selector.into()), ValueSource::NextText)
    }

    pub fn split(mut self, delimiter: impl Into<String>, index: usize) -> Self {
        self.split = Some((delimiter.into(), index));
        self
    }

    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    pub fn strip_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strip_suffix = Some(suffix.into());
        self
    }

    pub fn join(mut self, separator: impl Into<String>) -> Self {
        self.join = Some(separator.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn post_process(&self, value: String) -> String {
        let mut value = match &self.split {
            Some((delimiter, index)) => value
                .split(delimiter.as_str())
                .nth(*index)
                .unwrap_or("")
                .trim()
                .to_string(),
            None => value.trim().to_string(),
        };
        if let Some(prefix) = &self.strip_prefix {
            if let Some(rest) = value.strip_prefix(prefix.as_str()) {
                value = rest.trim().to_string();
            }
        }
        if let Some(suffix) = &self.strip_suffix {
            if let Some(rest) = value.strip_suffix(suffix.as_str()) {
                value = rest.trim().to_string();
            }
        }
        value
    }
}

/// Plain HTTP extractor: fetches the target with reqwest and evaluates the
/// script over the returned markup.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: reqwest::Client,
}

impl HtmlExtractor {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(&self, target: &str, script: &ExtractionScript) -> Result<Vec<RawRecord>> {
        info!("🌐 Fetching {}", target);
        let mut request = self.client.get(target);
        for (name, value) in &script.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?.error_for_status()?;
        let html = response.text().await?;
        extract_records(&html, target, script)
    }
}

/// Evaluates `script` over an already fetched document.
pub fn extract_records(html: &str, base_url: &str, script: &ExtractionScript) -> Result<Vec<RawRecord>> {
    let base = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
    let document = Html::parse_document(html);

    if let Some(wait_for) = &script.wait_for {
        let ready = parse_selector(wait_for)?;
        if document.select(&ready).next().is_none() {
            return Err(Error::Extraction(format!(
                "`{}` never appeared on {}",
                wait_for, base_url
            )));
        }
    }

    let items = parse_selector(&script.items)?;
    let fields = script
        .fields
        .iter()
        .map(|rule| Ok((rule, rule.selector.as_deref().map(parse_selector).transpose()?)))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    'items: for item in document.select(&items) {
        let mut record = RawRecord::new();
        for (rule, selector) in &fields {
            let value = read_field(item, rule, selector.as_ref(), &base)
                .map(|v| rule.post_process(v))
                .unwrap_or_default();
            if rule.required && value.is_empty() {
                skipped += 1;
                continue 'items;
            }
            record.insert(rule.name.as_str(), value);
        }
        records.push(record);
    }

    debug!(url = base_url, records = records.len(), skipped, "Extracted records");
    Ok(records)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Extraction(format!("invalid selector `{}`: {:?}", selector, e)))
}

fn read_field(item: ElementRef<'_>, rule: &FieldRule, selector: Option<&Selector>, base: &Url) -> Option<String> {
    let matches: Vec<ElementRef<'_>> = match selector {
        Some(selector) => item.select(selector).collect(),
        None => vec![item],
    };

    match &rule.join {
        Some(separator) => {
            let values: Vec<String> = matches
                .into_iter()
                .filter_map(|el| read_value(el, &rule.source, base))
                .filter(|v| !v.is_empty())
                .collect();
            Some(values.join(separator))
        }
        None => matches
            .into_iter()
            .next()
            .and_then(|el| read_value(el, &rule.source, base)),
    }
}

fn read_value(element: ElementRef<'_>, source: &ValueSource, base: &Url) -> Option<String> {
    match source {
        ValueSource::Text => Some(collapse_whitespace(element.text())),
        ValueSource::Attr(name) => element.value().attr(name).map(|v| v.trim().to_string()),
        ValueSource::Href(name) => {
            let raw = element.value().attr(name)?.trim();
            Some(base.join(raw).map(|u| u.to_string()).unwrap_or_else(|_| raw.to_string()))
        }
        ValueSource::NextText => element
            .next_sibling()
            .and_then(|node| node.value().as_text().map(|t| collapse_whitespace(std::iter::once(&**t)))),
    }
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
