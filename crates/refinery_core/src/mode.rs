use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InputError;

/// Which remote operation a submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Scrape,
    Crawl,
    Map,
    Search,
}

impl ExtractionMode {
    pub const ALL: [ExtractionMode; 4] = [
        ExtractionMode::Scrape,
        ExtractionMode::Crawl,
        ExtractionMode::Map,
        ExtractionMode::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMode::Scrape => "scrape",
            ExtractionMode::Crawl => "crawl",
            ExtractionMode::Map => "map",
            ExtractionMode::Search => "search",
        }
    }

    /// Hint shown next to the single input box for this mode.
    pub fn input_hint(self) -> &'static str {
        match self {
            ExtractionMode::Scrape => "https://example.com/article",
            ExtractionMode::Crawl => "Start URL (e.g. https://docs.python.org)",
            ExtractionMode::Map => "Site URL to map (e.g. https://example.com)",
            ExtractionMode::Search => "Search query (e.g. 'python tutorials')",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtractionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InputError::UnknownMode(s.trim().to_string()))
    }
}
