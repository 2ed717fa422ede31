use crate::{ExtractionMode, ExtractionResponse, PageMetadata, PageResult};

/// Mode-specific data that does not fit the page list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultExtra {
    #[default]
    None,
    /// Discovered links, in the order the service returned them.
    MapLinks(Vec<String>),
    /// Aggregate markdown synthesized by the service for a search.
    CombinedText(String),
}

/// Uniform outcome of any submission. Display code only ever looks at this,
/// never at the raw response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub mode: ExtractionMode,
    /// Scraped URL, crawl base URL, mapped site, or search query.
    pub source: String,
    pub pages: Vec<PageResult>,
    pub extra: ResultExtra,
}

impl ExtractionResult {
    pub fn links(&self) -> Option<&[String]> {
        match &self.extra {
            ResultExtra::MapLinks(links) => Some(links),
            _ => None,
        }
    }

    pub fn combined_text(&self) -> Option<&str> {
        match &self.extra {
            ResultExtra::CombinedText(text) => Some(text),
            _ => None,
        }
    }

    /// Wraps the combined search text into a page of its own. Both lengths are
    /// the text length in UTF-16 units, as the service counts them, so the
    /// page reports no reduction.
    pub fn combined_page(&self) -> Option<PageResult> {
        let text = self.combined_text()?;
        let length = text.encode_utf16().count() as u64;
        Some(PageResult {
            url: self.source.clone(),
            title: format!("Search: {}", self.source),
            markdown_content: text.to_string(),
            summary: None,
            screenshot_base64: None,
            pdf_base64: None,
            metadata: PageMetadata {
                original_length: length,
                cleaned_length: length,
            },
        })
    }

    /// True when there is nothing to show: a map without links, or any other
    /// mode without pages.
    pub fn has_no_results(&self) -> bool {
        match self.mode {
            ExtractionMode::Map => self.links().is_none_or(<[String]>::is_empty),
            _ => self.pages.is_empty(),
        }
    }
}

/// Converts a decoded response into the uniform result. Pure; service order
/// of pages and links is kept as is.
pub fn normalize(response: ExtractionResponse) -> ExtractionResult {
    match response {
        ExtractionResponse::Scrape(page) => ExtractionResult {
            mode: ExtractionMode::Scrape,
            source: page.url.clone(),
            pages: vec![page],
            extra: ResultExtra::None,
        },
        ExtractionResponse::Crawl(crawl) => ExtractionResult {
            mode: ExtractionMode::Crawl,
            source: crawl.base_url,
            pages: crawl.results,
            extra: ResultExtra::None,
        },
        ExtractionResponse::Map(map) => ExtractionResult {
            mode: ExtractionMode::Map,
            source: map.url,
            pages: Vec::new(),
            extra: ResultExtra::MapLinks(map.links),
        },
        ExtractionResponse::Search(search) => ExtractionResult {
            mode: ExtractionMode::Search,
            source: search.query,
            pages: search.results,
            extra: ResultExtra::CombinedText(search.combined_markdown),
        },
    }
}
