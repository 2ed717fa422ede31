use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use refinery_core::{Effect, Msg, PageResult};
use refinery_engine::{
    export_links, export_page, EngineEvent, EngineHandle, EngineSettings, EventSink, ExportError,
    Transport,
};

use super::app::AppEvent;

/// Outcome of an effect that the user should hear about.
#[derive(Debug)]
pub enum EffectReport {
    Exported(Vec<PathBuf>),
    ExportFailed(ExportError),
}

pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
    exported_utc: fn() -> String,
}

impl EffectRunner {
    pub fn new(
        transport: Arc<dyn Transport>,
        settings: EngineSettings,
        output_dir: PathBuf,
        events: mpsc::Sender<AppEvent>,
    ) -> std::io::Result<Self> {
        let sink = Arc::new(EngineEventForwarder { events });
        let engine = EngineHandle::new(transport, settings, sink)?;
        Ok(Self {
            engine,
            output_dir,
            exported_utc: || Utc::now().to_rfc3339(),
        })
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<EffectReport> {
        let mut reports = Vec::new();
        for effect in effects {
            match effect {
                Effect::Dispatch { seq, payload } => {
                    engine_info!("Dispatch seq={} mode={}", seq, payload.mode());
                    self.engine.submit(seq, payload);
                }
                Effect::Export {
                    source,
                    page,
                    links,
                } => reports.push(match self.export(&source, page.as_ref(), &links) {
                    Ok(paths) => EffectReport::Exported(paths),
                    Err(err) => {
                        engine_warn!("Export of {} failed: {}", source, err);
                        EffectReport::ExportFailed(err)
                    }
                }),
            }
        }
        reports
    }

    fn export(
        &self,
        source: &str,
        page: Option<&PageResult>,
        links: &[String],
    ) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::new();
        if let Some(page) = page {
            written.extend(export_page(&self.output_dir, page, &(self.exported_utc)())?);
        }
        if !links.is_empty() {
            written.push(export_links(&self.output_dir, source, links)?);
        }
        Ok(written)
    }
}

/// Turns engine completions into core messages on the app's event channel.
struct EngineEventForwarder {
    events: mpsc::Sender<AppEvent>,
}

impl EventSink for EngineEventForwarder {
    fn emit(&self, event: EngineEvent) {
        let msg = match event {
            EngineEvent::Completed {
                seq,
                result: Ok(result),
            } => Msg::Resolved { seq, result },
            EngineEvent::Completed {
                seq,
                result: Err(err),
            } => Msg::Failed {
                seq,
                message: err.message,
            },
        };
        let _ = self.events.send(AppEvent::Msg(msg));
    }
}
