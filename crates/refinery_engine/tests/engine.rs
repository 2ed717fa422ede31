use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use refinery_core::{
    build, BatchRequest, ExtractionMode, ExtractionResponse, PageResult, RequestOptions,
    RequestPayload,
};
use refinery_engine::{
    run_submission, BatchArchive, ChannelEventSink, EngineEvent, EngineHandle, EngineSettings,
    FailureKind, Transport, TransportError,
};

/// Answers each target after a per-target delay; targets starting with
/// "fail" produce a service error.
struct ScriptedTransport {
    delays: Vec<(String, Duration)>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(target, ms)| (target.to_string(), Duration::from_millis(*ms)))
                .collect(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, payload: &RequestPayload) -> Result<ExtractionResponse, TransportError> {
        let target = payload.target().to_string();
        self.sent.lock().unwrap().push(target.clone());
        let delay = self
            .delays
            .iter()
            .find(|(t, _)| *t == target)
            .map(|(_, d)| *d)
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        if target.starts_with("fail") {
            return Err(TransportError {
                kind: FailureKind::Service { status: 400 },
                message: format!("bad target {target}"),
            });
        }
        Ok(ExtractionResponse::Scrape(PageResult {
            url: target,
            markdown_content: "# ok".to_string(),
            ..PageResult::default()
        }))
    }

    async fn batch(&self, _request: &BatchRequest) -> Result<BatchArchive, TransportError> {
        Ok(BatchArchive {
            bytes: Vec::new(),
            content_type: None,
        })
    }
}

fn scrape(target: &str) -> RequestPayload {
    build(ExtractionMode::Scrape, target, &RequestOptions::default()).unwrap()
}

fn start_engine(
    transport: Arc<ScriptedTransport>,
    min_display: Duration,
) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::new(
        transport,
        EngineSettings { min_display },
        Arc::new(ChannelEventSink::new(tx)),
    )
    .expect("engine");
    (engine, rx)
}

#[test]
fn superseded_submission_never_reports() {
    engine_logging::initialize_for_tests();
    let transport = Arc::new(ScriptedTransport::new(&[("slow", 300), ("fast", 10)]));
    let (engine, rx) = start_engine(transport.clone(), Duration::ZERO);

    engine.submit(1, scrape("slow"));
    std::thread::sleep(Duration::from_millis(50));
    engine.submit(2, scrape("fast"));

    let event = rx.recv_timeout(Duration::from_secs(2)).expect("event");
    let EngineEvent::Completed { seq, result } = event;
    assert_eq!(seq, 2);
    assert_eq!(result.unwrap().pages[0].url, "fast");

    // The cancelled request must stay silent even after its delay elapses.
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    assert_eq!(*transport.sent.lock().unwrap(), vec!["slow", "fast"]);
}

#[test]
fn failures_are_reported_with_their_message() {
    let transport = Arc::new(ScriptedTransport::new(&[]));
    let (engine, rx) = start_engine(transport, Duration::ZERO);

    engine.submit(7, scrape("fail-me"));
    let EngineEvent::Completed { seq, result } =
        rx.recv_timeout(Duration::from_secs(2)).expect("event");
    assert_eq!(seq, 7);
    let err = result.unwrap_err();
    assert_eq!(err.kind, FailureKind::Service { status: 400 });
    assert_eq!(err.to_string(), "bad target fail-me");
}

#[tokio::test]
async fn success_waits_for_display_floor() {
    let transport = ScriptedTransport::new(&[("quick", 5)]);
    let started = Instant::now();
    let result = run_submission(&transport, &scrape("quick"), Duration::from_millis(200))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(result.mode, ExtractionMode::Scrape);
}

#[tokio::test]
async fn floor_does_not_extend_slow_success() {
    let transport = ScriptedTransport::new(&[("slow", 150)]);
    let started = Instant::now();
    run_submission(&transport, &scrape("slow"), Duration::from_millis(100))
        .await
        .unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(400));
}

#[tokio::test]
async fn failure_is_not_delayed_by_floor() {
    let transport = ScriptedTransport::new(&[("fail-fast", 5)]);
    let started = Instant::now();
    let err = run_submission(&transport, &scrape("fail-fast"), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(err.kind, FailureKind::Service { status: 400 });
}
