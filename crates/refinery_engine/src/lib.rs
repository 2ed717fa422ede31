//! Refinery engine: transport to the extraction service, the submission
//! worker and output export.
mod client;
mod engine;
mod export;
mod filename;
mod persist;
mod types;

pub use client::{
    classify_error_body, decode_response, endpoint_path, ClientSettings, ReqwestTransport,
    Transport, BATCH_PATH, DEFAULT_API_URL,
};
pub use engine::{
    run_submission, ChannelEventSink, EngineHandle, EngineSettings, EventSink,
    DEFAULT_MIN_DISPLAY,
};
pub use export::{export_links, export_page, save_archive, ExportError, BATCH_ARCHIVE_FILENAME};
pub use filename::deterministic_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{BatchArchive, EngineEvent, FailureKind, TransportError, GENERIC_FAILURE};
