use crate::{ExtractionMode, Facet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseView {
    #[default]
    Empty,
    Loading {
        mode: ExtractionMode,
    },
    /// Well-formed response with nothing to show.
    NoResults {
        mode: ExtractionMode,
    },
    Displaying {
        mode: ExtractionMode,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub mode: ExtractionMode,
    pub input: String,
    pub phase: PhaseView,
    pub source: Option<String>,
    pub pages: Vec<PageTabView>,
    pub current: Option<PageView>,
    pub links: Vec<String>,
    pub has_combined: bool,
    pub consolidated: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTabView {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub facet: Facet,
    pub available_facets: Vec<Facet>,
    pub original_length: u64,
    pub cleaned_length: u64,
    pub reduction_percent: i64,
    pub body: FacetBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetBody {
    Markdown(String),
    Raw(String),
    /// Binary facets are not drawn in the terminal; only their size is shown.
    Screenshot {
        encoded_len: usize,
    },
    Document {
        encoded_len: usize,
    },
}
