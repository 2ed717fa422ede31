#![allow(dead_code)]

use std::sync::Once;

use refinery_core::{
    update, AppState, Effect, ExtractionMode, ExtractionResult, Msg, PageMetadata, PageResult,
    RequestOptions, SubmissionSeq,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Types `input` into the box for `mode` and submits it.
pub fn submit(state: AppState, mode: ExtractionMode, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::ModeSelected(mode));
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

pub fn submit_with(
    state: AppState,
    mode: ExtractionMode,
    input: &str,
    options: RequestOptions,
) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::OptionsChanged(options));
    submit(state, mode, input)
}

pub fn dispatched_seq(effects: &[Effect]) -> SubmissionSeq {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Dispatch { seq, .. } => Some(*seq),
            _ => None,
        })
        .expect("dispatch effect")
}

pub fn page(url: &str) -> PageResult {
    PageResult {
        url: url.to_string(),
        title: format!("Title of {url}"),
        markdown_content: format!("# {url}\n\nbody"),
        metadata: PageMetadata {
            original_length: 200,
            cleaned_length: 50,
        },
        ..PageResult::default()
    }
}

pub fn page_with_screenshot(url: &str) -> PageResult {
    PageResult {
        screenshot_base64: Some("iVBORw0KGgo=".to_string()),
        ..page(url)
    }
}

pub fn crawl_result(pages: Vec<PageResult>) -> ExtractionResult {
    ExtractionResult {
        mode: ExtractionMode::Crawl,
        source: "https://site.test".to_string(),
        pages,
        extra: refinery_core::ResultExtra::None,
    }
}

/// Submits a crawl and resolves it with `pages`.
pub fn displaying(pages: Vec<PageResult>) -> AppState {
    let (state, effects) = submit(AppState::new(), ExtractionMode::Crawl, "https://site.test");
    let seq = dispatched_seq(&effects);
    let (mut state, _) = update(
        state,
        Msg::Resolved {
            seq,
            result: crawl_result(pages),
        },
    );
    state.consume_dirty();
    state
}
