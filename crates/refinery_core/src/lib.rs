//! Refinery core: request building, response normalization and the pure
//! navigation state machine driven by `update`.
mod effect;
mod facet;
mod mode;
mod msg;
mod normalize;
mod preview;
mod request;
mod response;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use facet::Facet;
pub use mode::ExtractionMode;
pub use msg::Msg;
pub use normalize::{normalize, ExtractionResult, ResultExtra};
pub use preview::{prepare_preview_content, MAX_PREVIEW_CONTENT};
pub use request::{
    build, build_batch, BatchRequest, CrawlRequest, InputError, MapRequest, RequestOptions,
    RequestPayload, ScrapeRequest, SearchRequest, DEFAULT_LIMIT, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_PAGES, LIMIT_RANGE, MAX_DEPTH_RANGE, MAX_PAGES_RANGE,
};
pub use response::{
    CrawlResponse, ExtractionResponse, MapResponse, PageMetadata, PageResult, SearchResponse,
};
pub use state::{AppState, NavigationState, Phase, SubmissionSeq};
pub use update::update;
pub use view_model::{AppViewModel, FacetBody, PageTabView, PageView, PhaseView};
