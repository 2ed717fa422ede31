use std::borrow::Cow;

use crate::view_model::{AppViewModel, FacetBody, PageTabView, PageView, PhaseView};
use crate::{
    prepare_preview_content, ExtractionMode, ExtractionResult, Facet, PageResult, RequestOptions,
};

/// Monotonic tag for submissions; responses carrying an older tag are stale.
pub type SubmissionSeq = u64;

/// Which page and facet of the current result are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    selected_index: usize,
    active_facet: Facet,
    consolidated: bool,
}

impl NavigationState {
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn active_facet(&self) -> Facet {
        self.active_facet
    }

    /// Showing the synthesized combined search page instead of a result page.
    pub fn consolidated(&self) -> bool {
        self.consolidated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Empty,
    Loading {
        seq: SubmissionSeq,
        mode: ExtractionMode,
    },
    Displaying {
        result: ExtractionResult,
        nav: NavigationState,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    mode: ExtractionMode,
    input: String,
    options: RequestOptions,
    phase: Phase,
    last_seq: SubmissionSeq,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// The page currently on screen, synthesizing the combined search page when
    /// the consolidated view is active.
    pub fn current_page(&self) -> Option<Cow<'_, PageResult>> {
        match &self.phase {
            Phase::Displaying { result, nav } => current_page_of(result, nav),
            _ => None,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let mut view = AppViewModel {
            mode: self.mode,
            input: self.input.clone(),
            phase: PhaseView::Empty,
            source: None,
            pages: Vec::new(),
            current: None,
            links: Vec::new(),
            has_combined: false,
            consolidated: false,
            dirty: self.dirty,
        };

        match &self.phase {
            Phase::Empty => {}
            Phase::Loading { mode, .. } => view.phase = PhaseView::Loading { mode: *mode },
            Phase::Error { message } => {
                view.phase = PhaseView::Error {
                    message: message.clone(),
                }
            }
            Phase::Displaying { result, nav } => {
                view.phase = if result.has_no_results() {
                    PhaseView::NoResults { mode: result.mode }
                } else {
                    PhaseView::Displaying { mode: result.mode }
                };
                view.source = Some(result.source.clone());
                view.links = result.links().map(<[String]>::to_vec).unwrap_or_default();
                view.has_combined = result.combined_text().is_some();
                view.consolidated = nav.consolidated;
                view.pages = result
                    .pages
                    .iter()
                    .enumerate()
                    .map(|(index, page)| PageTabView {
                        index,
                        title: page.title.clone(),
                        url: page.url.clone(),
                        selected: !nav.consolidated && index == nav.selected_index,
                    })
                    .collect();
                view.current =
                    current_page_of(result, nav).map(|page| page_view(&page, nav.active_facet));
            }
        }
        view
    }

    pub(crate) fn set_input(&mut self, input: String) -> bool {
        if self.input == input {
            return false;
        }
        self.input = input;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_mode(&mut self, mode: ExtractionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_options(&mut self, options: RequestOptions) -> bool {
        if self.options == options {
            return false;
        }
        self.options = options;
        self.mark_dirty();
        true
    }

    /// Enters `Loading` under a fresh sequence number, dropping any previous
    /// result, error or in-flight submission.
    pub(crate) fn begin_submission(&mut self, mode: ExtractionMode) -> SubmissionSeq {
        self.last_seq += 1;
        self.phase = Phase::Loading {
            seq: self.last_seq,
            mode,
        };
        self.mark_dirty();
        self.last_seq
    }

    fn is_current_submission(&self, seq: SubmissionSeq) -> bool {
        matches!(self.phase, Phase::Loading { seq: current, .. } if current == seq)
    }

    pub(crate) fn resolve(&mut self, seq: SubmissionSeq, result: ExtractionResult) -> bool {
        if !self.is_current_submission(seq) {
            return false;
        }
        self.phase = Phase::Displaying {
            result,
            nav: NavigationState::default(),
        };
        self.mark_dirty();
        true
    }

    pub(crate) fn fail(&mut self, seq: SubmissionSeq, message: String) -> bool {
        if !self.is_current_submission(seq) {
            return false;
        }
        self.phase = Phase::Error { message };
        self.mark_dirty();
        true
    }

    pub(crate) fn reset(&mut self) -> bool {
        match self.phase {
            Phase::Displaying { .. } | Phase::Error { .. } => {
                self.phase = Phase::Empty;
                self.mark_dirty();
                true
            }
            Phase::Empty | Phase::Loading { .. } => false,
        }
    }

    pub(crate) fn select_page(&mut self, index: usize) -> bool {
        let Phase::Displaying { result, nav } = &mut self.phase else {
            return false;
        };
        if index >= result.pages.len() {
            return false;
        }
        *nav = NavigationState {
            selected_index: index,
            active_facet: Facet::Preview,
            consolidated: false,
        };
        self.mark_dirty();
        true
    }

    pub(crate) fn select_facet(&mut self, facet: Facet) -> bool {
        let Phase::Displaying { result, nav } = &mut self.phase else {
            return false;
        };
        let available = current_page_of(result, nav).is_some_and(|page| page.has_facet(facet));
        if !available {
            return false;
        }
        nav.active_facet = facet;
        self.mark_dirty();
        true
    }

    pub(crate) fn toggle_consolidated(&mut self) -> bool {
        let Phase::Displaying { result, nav } = &mut self.phase else {
            return false;
        };
        if result.combined_text().is_none() || result.has_no_results() {
            return false;
        }
        nav.consolidated = !nav.consolidated;
        nav.active_facet = Facet::Preview;
        self.mark_dirty();
        true
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

fn current_page_of<'a>(
    result: &'a ExtractionResult,
    nav: &NavigationState,
) -> Option<Cow<'a, PageResult>> {
    if nav.consolidated {
        return result.combined_page().map(Cow::Owned);
    }
    result.pages.get(nav.selected_index).map(Cow::Borrowed)
}

fn page_view(page: &PageResult, facet: Facet) -> PageView {
    let body = match facet {
        Facet::Preview => FacetBody::Markdown(prepare_preview_content(&page.markdown_content)),
        Facet::Raw => FacetBody::Raw(page.markdown_content.clone()),
        Facet::Screenshot => FacetBody::Screenshot {
            encoded_len: page.screenshot_base64.as_ref().map_or(0, String::len),
        },
        Facet::Document => FacetBody::Document {
            encoded_len: page.pdf_base64.as_ref().map_or(0, String::len),
        },
    };
    PageView {
        url: page.url.clone(),
        title: page.title.clone(),
        summary: page.summary.clone(),
        facet,
        available_facets: page.facets(),
        original_length: page.metadata.original_length,
        cleaned_length: page.metadata.cleaned_length,
        reduction_percent: page.reduction_percent(),
        body,
    }
}
