use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use refinery_core::{normalize, ExtractionResult, RequestPayload, SubmissionSeq};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, Transport, TransportError};

/// Default floor on how long a successful submission stays in `Loading`.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub min_display: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_display: DEFAULT_MIN_DISPLAY,
        }
    }
}

/// Receives engine events on the worker thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Submit {
        seq: SubmissionSeq,
        payload: RequestPayload,
    },
}

/// Runs submissions on a dedicated thread with its own tokio runtime.
///
/// At most one submission is in flight: submitting again cancels the previous
/// one, so a superseded request never reports back.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        transport: Arc<dyn Transport>,
        settings: EngineSettings,
        sink: Arc<dyn EventSink>,
    ) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("refinery-engine".to_string())
            .spawn(move || {
                let mut in_flight: Option<CancellationToken> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Submit { seq, payload } => {
                            if let Some(previous) = in_flight.take() {
                                previous.cancel();
                            }
                            let token = CancellationToken::new();
                            in_flight = Some(token.clone());
                            runtime.spawn(handle_submit(
                                transport.clone(),
                                sink.clone(),
                                settings.min_display,
                                seq,
                                payload,
                                token,
                            ));
                        }
                    }
                }
                engine_debug!("Engine command channel closed; shutting down");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, seq: SubmissionSeq, payload: RequestPayload) {
        if self
            .cmd_tx
            .send(EngineCommand::Submit { seq, payload })
            .is_err()
        {
            engine_warn!("Engine is gone; submission seq={} dropped", seq);
        }
    }
}

async fn handle_submit(
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
    min_display: Duration,
    seq: SubmissionSeq,
    payload: RequestPayload,
    token: CancellationToken,
) {
    tokio::select! {
        _ = token.cancelled() => {
            engine_debug!("Submission seq={} superseded before completion", seq);
        }
        result = run_submission(transport.as_ref(), &payload, min_display) => {
            match &result {
                Ok(result) => engine_info!(
                    "Submission seq={} resolved: {} page(s)",
                    seq,
                    result.pages.len()
                ),
                Err(err) => engine_warn!("Submission seq={} failed ({}): {}", seq, err.kind, err),
            }
            sink.emit(EngineEvent::Completed { seq, result });
        }
    }
}

/// Sends `payload` and normalizes the response. Success waits out the
/// display floor measured from submission; failure returns immediately.
pub async fn run_submission(
    transport: &dyn Transport,
    payload: &RequestPayload,
    min_display: Duration,
) -> Result<ExtractionResult, TransportError> {
    let floor = tokio::time::sleep(min_display);
    let response = transport.send(payload).await?;
    floor.await;
    Ok(normalize(response))
}
