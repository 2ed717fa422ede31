use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{bail, Context};
use engine_logging::{engine_debug, engine_info, engine_warn};
use refinery_core::{build_batch, update, AppState, Msg, Phase, RequestOptions};
use refinery_engine::{save_archive, ReqwestTransport, Transport};

use super::config::AppConfig;
use super::effects::{EffectReport, EffectRunner};
use super::shell::{self, ShellCommand};
use super::ui;
use crate::cli::{Args, Command, OneShot, ViewArgs};

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// A core message, e.g. a completion forwarded by the engine.
    Msg(Msg),
    /// A line typed into the shell.
    Line(String),
    /// Stdin reached end of file.
    InputClosed,
}

pub fn run_app(args: Args) -> anyhow::Result<ExitCode> {
    let config = AppConfig::from_args(&args);
    engine_logging::initialize(&config.log_destination, config.log_level);
    engine_info!("Using extraction service at {}", config.api_url);

    let transport = Arc::new(
        ReqwestTransport::new(config.client_settings()).context("failed to build HTTP client")?,
    );

    match &args.command {
        Command::Batch {
            urls,
            wait_for,
            include_images,
        } => {
            let options = RequestOptions {
                wait_for_selector: wait_for.clone().unwrap_or_default(),
                include_images: *include_images,
                ..RequestOptions::default()
            };
            run_batch(&config, transport.as_ref(), urls, &options)
        }
        Command::Shell => run_shell(&config, transport),
        command => match command.one_shot() {
            Some(one_shot) => run_one_shot(&config, transport, one_shot),
            None => Ok(ExitCode::SUCCESS),
        },
    }
}

/// Owns the `AppState` and feeds it messages from one channel.
struct Orchestrator<W: Write> {
    state: AppState,
    runner: EffectRunner,
    events: mpsc::Receiver<AppEvent>,
    out: W,
    export_failures: usize,
}

impl<W: Write> Orchestrator<W> {
    fn new(runner: EffectRunner, events: mpsc::Receiver<AppEvent>, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            events,
            out,
            export_failures: 0,
        }
    }

    /// Applies one message and runs its effects. Returns whether the view changed.
    fn dispatch(&mut self, msg: Msg) -> io::Result<bool> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;

        for report in self.runner.run(effects) {
            self.report(report)?;
        }
        Ok(changed)
    }

    fn report(&mut self, report: EffectReport) -> io::Result<()> {
        match report {
            EffectReport::Exported(paths) => {
                for path in paths {
                    writeln!(self.out, "Saved {}", path.display())?;
                }
            }
            EffectReport::ExportFailed(err) => {
                self.export_failures += 1;
                writeln!(self.out, "Export failed: {err}")?;
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let text = ui::render::render(&self.state.view());
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// Blocks until the in-flight submission resolves or fails.
    fn wait_for_completion(&mut self) -> anyhow::Result<()> {
        while self.state.is_loading() {
            match self.events.recv() {
                Ok(AppEvent::Msg(msg)) => {
                    self.dispatch(msg)?;
                }
                Ok(other) => engine_debug!("Ignoring {:?} while waiting for a result", other),
                Err(_) => bail!("engine stopped before the request finished"),
            }
        }
        Ok(())
    }

    /// Navigation for one-shot runs; a rejected step is logged and skipped.
    fn apply_view(&mut self, view: &ViewArgs) -> io::Result<()> {
        if let Some(page) = view.page {
            self.navigate(Msg::PageSelected(page.saturating_sub(1)))?;
        }
        if view.combined {
            self.navigate(Msg::ConsolidatedToggled)?;
        }
        if let Some(facet) = view.facet {
            self.navigate(Msg::FacetSelected(facet))?;
        }
        Ok(())
    }

    fn navigate(&mut self, msg: Msg) -> io::Result<bool> {
        let label = format!("{msg:?}");
        let changed = self.dispatch(msg)?;
        if !changed {
            engine_warn!("{} does not apply to the current result", label);
        }
        Ok(changed)
    }

    fn execute(&mut self, command: ShellCommand) -> io::Result<ControlFlow<()>> {
        match command {
            ShellCommand::Mode(mode) => {
                self.dispatch(Msg::ModeSelected(mode))?;
                writeln!(self.out, "mode: {}", self.state.mode())?;
            }
            ShellCommand::Set(edit) => {
                let mut options = self.state.options().clone();
                edit.apply(&mut options);
                self.dispatch(Msg::OptionsChanged(options))?;
                writeln!(self.out, "options: {:?}", self.state.options())?;
            }
            ShellCommand::Go(input) => {
                self.dispatch(Msg::InputChanged(input))?;
                if self.dispatch(Msg::Submitted)? {
                    self.render()?;
                }
            }
            ShellCommand::Page(index) => self.navigate_and_show(Msg::PageSelected(index))?,
            ShellCommand::Facet(facet) => self.navigate_and_show(Msg::FacetSelected(facet))?,
            ShellCommand::Combined => self.navigate_and_show(Msg::ConsolidatedToggled)?,
            ShellCommand::Reset => self.navigate_and_show(Msg::ResetClicked)?,
            ShellCommand::Export => {
                if self.state.current_page().is_none()
                    && self.state.view().links.is_empty()
                {
                    writeln!(self.out, "nothing to export")?;
                } else {
                    self.dispatch(Msg::ExportRequested)?;
                }
            }
            ShellCommand::Show => self.render()?,
            ShellCommand::Help => writeln!(self.out, "{}", shell::HELP)?,
            ShellCommand::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn navigate_and_show(&mut self, msg: Msg) -> io::Result<()> {
        if self.navigate(msg)? {
            self.render()
        } else {
            writeln!(self.out, "not available here")
        }
    }

    fn failed(&self) -> bool {
        matches!(self.state.phase(), Phase::Error { .. })
    }
}

fn run_one_shot(
    config: &AppConfig,
    transport: Arc<dyn Transport>,
    one_shot: OneShot,
) -> anyhow::Result<ExitCode> {
    let (tx, rx) = mpsc::channel();
    let runner = EffectRunner::new(
        transport,
        config.engine_settings(),
        config.output_dir_or_default(),
        tx,
    )
    .context("failed to start engine")?;
    let mut app = Orchestrator::new(runner, rx, io::stdout().lock());

    app.dispatch(Msg::ModeSelected(one_shot.mode))?;
    app.dispatch(Msg::OptionsChanged(one_shot.options))?;
    app.dispatch(Msg::InputChanged(one_shot.input))?;
    app.dispatch(Msg::Submitted)?;
    if !app.state.is_loading() {
        bail!("nothing to submit: {} is empty", one_shot.mode.input_hint());
    }

    app.wait_for_completion()?;
    app.apply_view(&one_shot.view)?;
    app.render()?;
    if app.failed() {
        return Ok(ExitCode::FAILURE);
    }

    if config.output_dir.is_some() {
        app.dispatch(Msg::ExportRequested)?;
    }
    Ok(if app.export_failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_shell(config: &AppConfig, transport: Arc<dyn Transport>) -> anyhow::Result<ExitCode> {
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone())?;
    let runner = EffectRunner::new(
        transport,
        config.engine_settings(),
        config.output_dir_or_default(),
        tx,
    )
    .context("failed to start engine")?;
    let mut app = Orchestrator::new(runner, rx, io::stdout().lock());

    writeln!(app.out, "{}", shell::HELP)?;
    app.render()?;

    while let Ok(event) = app.events.recv() {
        match event {
            AppEvent::Msg(msg) => {
                if app.dispatch(msg)? {
                    app.render()?;
                }
            }
            AppEvent::Line(line) => match shell::parse_line(&line) {
                Ok(Some(command)) => {
                    if app.execute(command)?.is_break() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => writeln!(app.out, "error: {err}")?,
            },
            AppEvent::InputClosed => {
                if app.state.is_loading() {
                    app.wait_for_completion()?;
                    app.render()?;
                }
                break;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("refinery-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(AppEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        engine_warn!("Failed to read stdin: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}

fn run_batch(
    config: &AppConfig,
    transport: &ReqwestTransport,
    urls: &[String],
    options: &RequestOptions,
) -> anyhow::Result<ExitCode> {
    let request = build_batch(&urls.join("\n"), options)?;
    engine_info!("Batch scrape of {} URL(s)", request.urls.len());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let archive = runtime
        .block_on(transport.batch(&request))
        .context("batch scrape failed")?;

    let path = save_archive(&config.output_dir_or_default(), &archive)?;
    println!(
        "Saved {} page(s) to {} ({} bytes)",
        request.urls.len(),
        path.display(),
        archive.bytes.len()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use refinery_core::{
        BatchRequest, ExtractionMode, ExtractionResponse, PageMetadata, PageResult,
        RequestPayload, SearchResponse,
    };
    use refinery_engine::{BatchArchive, EngineSettings, FailureKind, TransportError};
    use tempfile::TempDir;

    struct FakeService;

    #[async_trait::async_trait]
    impl Transport for FakeService {
        async fn send(
            &self,
            payload: &RequestPayload,
        ) -> Result<ExtractionResponse, TransportError> {
            match payload {
                RequestPayload::Search(request) => {
                    Ok(ExtractionResponse::Search(SearchResponse {
                        query: request.query.clone(),
                        results: vec![PageResult {
                            url: "https://a.test".to_string(),
                            title: "A".to_string(),
                            markdown_content: "# A".to_string(),
                            metadata: PageMetadata {
                                original_length: 100,
                                cleaned_length: 40,
                            },
                            ..PageResult::default()
                        }],
                        combined_markdown: "# A".to_string(),
                    }))
                }
                _ => Err(TransportError {
                    kind: FailureKind::Service { status: 404 },
                    message: "No content retrieved from browser".to_string(),
                }),
            }
        }

        async fn batch(&self, _request: &BatchRequest) -> Result<BatchArchive, TransportError> {
            Ok(BatchArchive {
                bytes: Vec::new(),
                content_type: None,
            })
        }
    }

    fn orchestrator(output_dir: &std::path::Path) -> Orchestrator<Vec<u8>> {
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(
            Arc::new(FakeService),
            EngineSettings {
                min_display: Duration::ZERO,
            },
            output_dir.to_path_buf(),
            tx,
        )
        .unwrap();
        Orchestrator::new(runner, rx, Vec::new())
    }

    fn output(app: &Orchestrator<Vec<u8>>) -> String {
        String::from_utf8_lossy(&app.out).into_owned()
    }

    #[test]
    fn search_session_navigates_and_exports() {
        let temp = TempDir::new().unwrap();
        let mut app = orchestrator(temp.path());

        for line in ["mode search", "set limit 2", "go rust async"] {
            let command = shell::parse_line(line).unwrap().unwrap();
            assert!(app.execute(command).unwrap().is_continue());
        }
        assert!(app.state.is_loading());
        app.wait_for_completion().unwrap();

        app.execute(ShellCommand::Combined).unwrap();
        let text = output(&app);
        assert!(text.contains("[search] Searching..."));
        assert!(text.contains("Search: rust async"));
        assert!(text.contains("(0% reduction)"));

        app.execute(ShellCommand::Page(0)).unwrap();
        assert!(output(&app).contains("100 -> 40 chars (60% reduction)"));

        app.execute(ShellCommand::Export).unwrap();
        assert!(output(&app).contains("Saved "));
        assert_eq!(app.export_failures, 0);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn service_failure_lands_in_error() {
        let temp = TempDir::new().unwrap();
        let mut app = orchestrator(temp.path());

        app.dispatch(Msg::InputChanged("https://a.test".to_string()))
            .unwrap();
        app.dispatch(Msg::Submitted).unwrap();
        app.wait_for_completion().unwrap();
        app.render().unwrap();

        assert!(app.failed());
        assert!(output(&app).ends_with("Error: No content retrieved from browser\n"));
    }

    #[test]
    fn unavailable_navigation_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut app = orchestrator(temp.path());

        app.execute(ShellCommand::Page(3)).unwrap();
        app.execute(ShellCommand::Export).unwrap();
        assert_eq!(output(&app), "not available here\nnothing to export\n");
        assert_eq!(app.state.mode(), ExtractionMode::Scrape);
    }
}
