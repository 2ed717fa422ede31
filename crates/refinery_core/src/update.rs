use engine_logging::{engine_debug, engine_info};

use crate::{build, AppState, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Rejected messages (stale responses, out-of-range pages, missing facets)
/// leave the state untouched and do not mark it dirty.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::OptionsChanged(options) => {
            state.set_options(options);
            Vec::new()
        }
        Msg::Submitted => match build(state.mode(), state.input(), state.options()) {
            Ok(payload) => {
                let seq = state.begin_submission(payload.mode());
                engine_info!(
                    "Submitting {} seq={} target={}",
                    payload.mode(),
                    seq,
                    payload.target()
                );
                vec![Effect::Dispatch { seq, payload }]
            }
            Err(err) => {
                engine_debug!("Submission ignored: {}", err);
                Vec::new()
            }
        },
        Msg::Resolved { seq, result } => {
            if !state.resolve(seq, result) {
                engine_debug!("Discarding stale response seq={}", seq);
            }
            Vec::new()
        }
        Msg::Failed { seq, message } => {
            if !state.fail(seq, message) {
                engine_debug!("Discarding stale failure seq={}", seq);
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            state.reset();
            Vec::new()
        }
        Msg::PageSelected(index) => {
            if !state.select_page(index) {
                engine_debug!("Page selection {} rejected", index);
            }
            Vec::new()
        }
        Msg::FacetSelected(facet) => {
            if !state.select_facet(facet) {
                engine_debug!("Facet {} not available", facet);
            }
            Vec::new()
        }
        Msg::ConsolidatedToggled => {
            state.toggle_consolidated();
            Vec::new()
        }
        Msg::ExportRequested => export_effect(&state).into_iter().collect(),
    };

    (state, effects)
}

fn export_effect(state: &AppState) -> Option<Effect> {
    let Phase::Displaying { result, .. } = state.phase() else {
        return None;
    };
    if result.has_no_results() {
        return None;
    }
    Some(Effect::Export {
        source: result.source.clone(),
        page: state.current_page().map(|page| page.into_owned()),
        links: result.links().map(<[String]>::to_vec).unwrap_or_default(),
    })
}
