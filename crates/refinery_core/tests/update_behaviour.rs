mod common;

use common::{crawl_result, dispatched_seq, init_logging, page, submit, submit_with};
use pretty_assertions::assert_eq;
use refinery_core::{
    normalize, update, AppState, Effect, ExtractionMode, ExtractionResponse, Facet, Msg,
    PageMetadata, PageResult, Phase, PhaseView, RequestOptions, RequestPayload, SearchRequest,
    SearchResponse,
};

#[test]
fn blank_input_submission_is_a_noop() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InputChanged("   ".to_string()));
    let mut before = state.clone();
    before.consume_dirty();

    let (mut next, effects) = update(before.clone(), Msg::Submitted);

    assert!(effects.is_empty());
    assert_eq!(next.phase(), &Phase::Empty);
    assert!(!next.consume_dirty());
    assert_eq!(next, before);
}

#[test]
fn submit_enters_loading_and_dispatches() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), ExtractionMode::Map, " https://a.test ");

    assert_eq!(
        state.phase(),
        &Phase::Loading {
            seq: 1,
            mode: ExtractionMode::Map
        }
    );
    assert_eq!(
        effects,
        vec![Effect::Dispatch {
            seq: 1,
            payload: RequestPayload::Map(refinery_core::MapRequest {
                url: "https://a.test".to_string()
            }),
        }]
    );
    assert!(state.consume_dirty());
    assert_eq!(
        state.view().phase,
        PhaseView::Loading {
            mode: ExtractionMode::Map
        }
    );
}

#[test]
fn resolve_displays_first_page_in_preview() {
    init_logging();
    let (state, effects) = submit(AppState::new(), ExtractionMode::Crawl, "https://site.test");
    let seq = dispatched_seq(&effects);

    let (mut state, _) = update(
        state,
        Msg::Resolved {
            seq,
            result: crawl_result(vec![page("https://site.test/a"), page("https://site.test/b")]),
        },
    );

    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(
        view.phase,
        PhaseView::Displaying {
            mode: ExtractionMode::Crawl
        }
    );
    assert_eq!(view.pages.len(), 2);
    assert!(view.pages[0].selected);
    assert!(!view.pages[1].selected);
    let current = view.current.expect("current page");
    assert_eq!(current.url, "https://site.test/a");
    assert_eq!(current.facet, Facet::Preview);
    assert_eq!(current.reduction_percent, 75);
}

#[test]
fn failure_lands_in_error_and_drops_previous_result() {
    init_logging();
    let state = common::displaying(vec![page("https://site.test/a")]);

    let (state, effects) = submit(state, ExtractionMode::Scrape, "https://other.test");
    let seq = dispatched_seq(&effects);
    assert!(state.current_page().is_none());

    let (state, _) = update(
        state,
        Msg::Failed {
            seq,
            message: "No content retrieved from browser".to_string(),
        },
    );
    assert_eq!(
        state.view().phase,
        PhaseView::Error {
            message: "No content retrieved from browser".to_string()
        }
    );
    assert!(state.current_page().is_none());
}

#[test]
fn stale_response_never_overwrites_newer_submission() {
    init_logging();
    let (state, first) = submit(AppState::new(), ExtractionMode::Scrape, "https://one.test");
    let first_seq = dispatched_seq(&first);
    let (state, second) = submit(state, ExtractionMode::Scrape, "https://two.test");
    let second_seq = dispatched_seq(&second);
    assert!(second_seq > first_seq);

    // The newer submission resolves first.
    let (state, _) = update(
        state,
        Msg::Resolved {
            seq: second_seq,
            result: normalize(ExtractionResponse::Scrape(page("https://two.test"))),
        },
    );
    // The older one arrives late and must be ignored.
    let (mut state, _) = update(
        state,
        Msg::Resolved {
            seq: first_seq,
            result: normalize(ExtractionResponse::Scrape(page("https://one.test"))),
        },
    );
    assert_eq!(state.current_page().unwrap().url, "https://two.test");
    state.consume_dirty();

    let (mut state, _) = update(
        state,
        Msg::Failed {
            seq: first_seq,
            message: "late failure".to_string(),
        },
    );
    assert!(!state.consume_dirty());
    assert_eq!(state.current_page().unwrap().url, "https://two.test");
}

#[test]
fn stale_response_ignored_while_newer_is_loading() {
    init_logging();
    let (state, first) = submit(AppState::new(), ExtractionMode::Scrape, "https://one.test");
    let (state, second) = submit(state, ExtractionMode::Scrape, "https://two.test");

    let (state, _) = update(
        state,
        Msg::Resolved {
            seq: dispatched_seq(&first),
            result: normalize(ExtractionResponse::Scrape(page("https://one.test"))),
        },
    );
    assert_eq!(
        state.phase(),
        &Phase::Loading {
            seq: dispatched_seq(&second),
            mode: ExtractionMode::Scrape
        }
    );
}

#[test]
fn reset_returns_to_empty_from_displaying_and_error() {
    init_logging();
    let state = common::displaying(vec![page("https://site.test/a")]);
    let (state, _) = update(state, Msg::ResetClicked);
    assert_eq!(state.phase(), &Phase::Empty);

    let (state, effects) = submit(state, ExtractionMode::Scrape, "https://a.test");
    let seq = dispatched_seq(&effects);
    let (state, _) = update(
        state,
        Msg::Failed {
            seq,
            message: "Server error: 500".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ResetClicked);
    assert_eq!(state.phase(), &Phase::Empty);
}

#[test]
fn reset_is_ignored_while_loading() {
    init_logging();
    let (state, _) = submit(AppState::new(), ExtractionMode::Scrape, "https://a.test");
    let (state, _) = update(state, Msg::ResetClicked);
    assert!(state.is_loading());
}

#[test]
fn empty_crawl_shows_no_results() {
    init_logging();
    let state = common::displaying(Vec::new());
    let view = state.view();
    assert_eq!(
        view.phase,
        PhaseView::NoResults {
            mode: ExtractionMode::Crawl
        }
    );
    assert!(view.pages.is_empty());
    assert!(view.current.is_none());

    let (_, effects) = update(state, Msg::ExportRequested);
    assert!(effects.is_empty());
}

#[test]
fn search_end_to_end_reports_page_and_combined_reduction() {
    init_logging();
    let options = RequestOptions {
        limit: 2,
        ..RequestOptions::default()
    };
    let (state, effects) = submit_with(AppState::new(), ExtractionMode::Search, "rust async", options);
    assert_eq!(
        effects,
        vec![Effect::Dispatch {
            seq: 1,
            payload: RequestPayload::Search(SearchRequest {
                query: "rust async".to_string(),
                limit: 2,
                include_images: None,
            }),
        }]
    );

    let response = ExtractionResponse::Search(SearchResponse {
        query: "rust async".to_string(),
        results: vec![PageResult {
            url: "a".to_string(),
            title: "A".to_string(),
            markdown_content: "# A".to_string(),
            metadata: PageMetadata {
                original_length: 100,
                cleaned_length: 40,
            },
            ..PageResult::default()
        }],
        combined_markdown: "# A".to_string(),
    });
    let (state, _) = update(
        state,
        Msg::Resolved {
            seq: 1,
            result: normalize(response),
        },
    );

    let view = state.view();
    assert_eq!(view.pages.len(), 1);
    assert!(view.has_combined);
    assert_eq!(view.current.as_ref().unwrap().reduction_percent, 60);

    let (state, _) = update(state, Msg::ConsolidatedToggled);
    let view = state.view();
    assert!(view.consolidated);
    assert!(view.pages.iter().all(|tab| !tab.selected));
    let combined = view.current.unwrap();
    assert_eq!(combined.title, "Search: rust async");
    assert_eq!(combined.reduction_percent, 0);
    assert_eq!(combined.original_length, combined.cleaned_length);
}

#[test]
fn map_result_exposes_links_in_order() {
    init_logging();
    let (state, effects) = submit(AppState::new(), ExtractionMode::Map, "https://a.test");
    let seq = dispatched_seq(&effects);
    let (state, _) = update(
        state,
        Msg::Resolved {
            seq,
            result: normalize(ExtractionResponse::Map(refinery_core::MapResponse {
                url: "https://a.test".to_string(),
                links: vec!["/x".to_string(), "/y".to_string()],
            })),
        },
    );

    let view = state.view();
    assert_eq!(
        view.phase,
        PhaseView::Displaying {
            mode: ExtractionMode::Map
        }
    );
    assert!(view.pages.is_empty());
    assert!(view.current.is_none());
    assert_eq!(view.links, vec!["/x".to_string(), "/y".to_string()]);

    let (_, effects) = update(state, Msg::ExportRequested);
    assert_eq!(
        effects,
        vec![Effect::Export {
            source: "https://a.test".to_string(),
            page: None,
            links: vec!["/x".to_string(), "/y".to_string()],
        }]
    );
}

#[test]
fn editing_input_marks_dirty_only_on_change() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::InputChanged("https://a.test".to_string()));
    assert!(state.consume_dirty());
    let (mut state, _) = update(state, Msg::InputChanged("https://a.test".to_string()));
    assert!(!state.consume_dirty());
    let (mut state, _) = update(state, Msg::ModeSelected(ExtractionMode::Scrape));
    assert!(!state.consume_dirty());
    assert_eq!(state.view().input, "https://a.test");
}
