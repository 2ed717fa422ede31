use crate::{ExtractionMode, ExtractionResult, Facet, RequestOptions, SubmissionSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL / query input box.
    InputChanged(String),
    /// User picked a different extraction mode.
    ModeSelected(ExtractionMode),
    /// User edited any of the mode-scoped option fields.
    OptionsChanged(RequestOptions),
    /// User submitted the current input.
    Submitted,
    /// A submission finished and its response was normalized.
    Resolved {
        seq: SubmissionSeq,
        result: ExtractionResult,
    },
    /// A submission failed; `message` is already user-facing.
    Failed { seq: SubmissionSeq, message: String },
    /// User went back to the input screen.
    ResetClicked,
    /// User selected a page of a multi-page result.
    PageSelected(usize),
    /// User switched the content facet of the current page.
    FacetSelected(Facet),
    /// User toggled the combined view of a search result.
    ConsolidatedToggled,
    /// User asked to save the current page to disk.
    ExportRequested,
}
