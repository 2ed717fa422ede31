use std::ops::RangeInclusive;

use serde::Serialize;

use crate::ExtractionMode;

pub const MAX_DEPTH_RANGE: RangeInclusive<u32> = 1..=5;
pub const MAX_PAGES_RANGE: RangeInclusive<u32> = 1..=50;
pub const LIMIT_RANGE: RangeInclusive<u32> = 1..=10;

pub const DEFAULT_MAX_DEPTH: u32 = 2;
pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const DEFAULT_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("a URL or search query is required")]
    EmptyInput,
    #[error("unknown extraction mode: {0}")]
    UnknownMode(String),
    #[error("unknown facet: {0}")]
    UnknownFacet(String),
}

/// The shared option fields behind the single input box. Values are kept as
/// the user typed them; `build` decides what each mode actually sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub wait_for_selector: String,
    pub target_selector: String,
    pub remove_selector: String,
    pub include_images: bool,
    pub summarize: bool,
    pub formats: Vec<String>,
    pub max_depth: i64,
    pub max_pages: i64,
    pub limit: i64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            wait_for_selector: String::new(),
            target_selector: String::new(),
            remove_selector: String::new(),
            include_images: false,
            summarize: false,
            formats: Vec::new(),
            max_depth: i64::from(DEFAULT_MAX_DEPTH),
            max_pages: i64::from(DEFAULT_MAX_PAGES),
            limit: i64::from(DEFAULT_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRequest {
    pub url: String,
    pub max_depth: u32,
    pub max_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
}

/// Bulk scrape; the service answers with a zip archive instead of JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
}

/// Exactly one request shape per submission. Serializes as the bare inner
/// struct, which is what the service expects as the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Scrape(ScrapeRequest),
    Crawl(CrawlRequest),
    Map(MapRequest),
    Search(SearchRequest),
}

impl RequestPayload {
    pub fn mode(&self) -> ExtractionMode {
        match self {
            RequestPayload::Scrape(_) => ExtractionMode::Scrape,
            RequestPayload::Crawl(_) => ExtractionMode::Crawl,
            RequestPayload::Map(_) => ExtractionMode::Map,
            RequestPayload::Search(_) => ExtractionMode::Search,
        }
    }

    /// The URL or query this payload was built from.
    pub fn target(&self) -> &str {
        match self {
            RequestPayload::Scrape(req) => &req.url,
            RequestPayload::Crawl(req) => &req.url,
            RequestPayload::Map(req) => &req.url,
            RequestPayload::Search(req) => &req.query,
        }
    }
}

/// Builds the payload for `mode` from the shared input surface.
///
/// Blank text options are dropped rather than sent as `""`, flags are only
/// sent when set, and numeric options are clamped into their bounds.
pub fn build(
    mode: ExtractionMode,
    input: &str,
    options: &RequestOptions,
) -> Result<RequestPayload, InputError> {
    let target = input.trim();
    if target.is_empty() {
        return Err(InputError::EmptyInput);
    }
    let target = target.to_string();

    let payload = match mode {
        ExtractionMode::Scrape => RequestPayload::Scrape(ScrapeRequest {
            url: target,
            wait_for_selector: non_blank(&options.wait_for_selector),
            target_selector: non_blank(&options.target_selector),
            remove_selector: non_blank(&options.remove_selector),
            include_images: flag(options.include_images),
            summarize: flag(options.summarize),
            formats: non_empty_formats(&options.formats),
        }),
        ExtractionMode::Crawl => RequestPayload::Crawl(CrawlRequest {
            url: target,
            max_depth: clamp_to(options.max_depth, &MAX_DEPTH_RANGE),
            max_pages: clamp_to(options.max_pages, &MAX_PAGES_RANGE),
            wait_for_selector: non_blank(&options.wait_for_selector),
            include_images: flag(options.include_images),
        }),
        ExtractionMode::Map => RequestPayload::Map(MapRequest { url: target }),
        ExtractionMode::Search => RequestPayload::Search(SearchRequest {
            query: target,
            limit: clamp_to(options.limit, &LIMIT_RANGE),
            include_images: flag(options.include_images),
        }),
    };
    Ok(payload)
}

/// Builds a batch request from newline- or comma-separated URLs.
pub fn build_batch(raw: &str, options: &RequestOptions) -> Result<BatchRequest, InputError> {
    let urls = parse_urls(raw);
    if urls.is_empty() {
        return Err(InputError::EmptyInput);
    }
    Ok(BatchRequest {
        urls,
        wait_for_selector: non_blank(&options.wait_for_selector),
        include_images: flag(options.include_images),
    })
}

fn parse_urls(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

fn non_empty_formats(formats: &[String]) -> Option<Vec<String>> {
    let cleaned: Vec<String> = formats
        .iter()
        .filter_map(|format| non_blank(format))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn clamp_to(value: i64, range: &RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(i64::from(*range.start()), i64::from(*range.end()));
    u32::try_from(clamped).unwrap_or(*range.start())
}
