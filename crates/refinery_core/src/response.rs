use serde::{Deserialize, Deserializer, Serialize};

use crate::{ExtractionMode, Facet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub original_length: u64,
    #[serde(default)]
    pub cleaned_length: u64,
}

impl PageMetadata {
    /// Share of the original content removed by cleaning, in whole percent.
    ///
    /// Zero when nothing was fetched. Negative when cleaning grew the page.
    pub fn reduction_percent(&self) -> i64 {
        if self.original_length == 0 {
            return 0;
        }
        let original = self.original_length as f64;
        let removed = original - self.cleaned_length as f64;
        (removed / original * 100.0).round() as i64
    }
}

/// One extracted page, as returned by scrape and inside crawl/search results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub markdown_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: PageMetadata,
}

impl PageResult {
    pub fn reduction_percent(&self) -> i64 {
        self.metadata.reduction_percent()
    }

    pub fn has_facet(&self, facet: Facet) -> bool {
        match facet {
            Facet::Preview | Facet::Raw => true,
            Facet::Screenshot => self.screenshot_base64.is_some(),
            Facet::Document => self.pdf_base64.is_some(),
        }
    }

    /// Facets this page can show, in tab order.
    pub fn facets(&self) -> Vec<Facet> {
        Facet::ALL
            .into_iter()
            .filter(|facet| self.has_facet(*facet))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub base_url: String,
    pub results: Vec<PageResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapResponse {
    pub url: String,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<PageResult>,
    pub combined_markdown: String,
}

/// A decoded success body. The variant is chosen by the mode that was
/// dispatched, never by sniffing the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResponse {
    Scrape(PageResult),
    Crawl(CrawlResponse),
    Map(MapResponse),
    Search(SearchResponse),
}

impl ExtractionResponse {
    pub fn mode(&self) -> ExtractionMode {
        match self {
            ExtractionResponse::Scrape(_) => ExtractionMode::Scrape,
            ExtractionResponse::Crawl(_) => ExtractionMode::Crawl,
            ExtractionResponse::Map(_) => ExtractionMode::Map,
            ExtractionResponse::Search(_) => ExtractionMode::Search,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
