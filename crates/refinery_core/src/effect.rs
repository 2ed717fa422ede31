use crate::{PageResult, RequestPayload, SubmissionSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `payload` to the endpoint bound to its mode.
    Dispatch {
        seq: SubmissionSeq,
        payload: RequestPayload,
    },
    /// Write the page on screen (and any map links) to disk.
    Export {
        source: String,
        page: Option<PageResult>,
        links: Vec<String>,
    },
}
