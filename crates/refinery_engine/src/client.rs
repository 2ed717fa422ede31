use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use refinery_core::{
    BatchRequest, ExtractionMode, ExtractionResponse, RequestPayload,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::{BatchArchive, FailureKind, TransportError, GENERIC_FAILURE};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const BATCH_PATH: &str = "/scrape/batch";

/// Remote operation bound to each mode. Total: every mode has exactly one.
pub fn endpoint_path(mode: ExtractionMode) -> &'static str {
    match mode {
        ExtractionMode::Scrape => "/scrape",
        ExtractionMode::Crawl => "/crawl",
        ExtractionMode::Map => "/map",
        ExtractionMode::Search => "/search",
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves the total request time unbounded; crawls can run long.
    pub request_timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_body_bytes: 256 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: &RequestPayload) -> Result<ExtractionResponse, TransportError>;

    async fn batch(&self, request: &BatchRequest) -> Result<BatchArchive, TransportError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: ClientSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        let joined = format!("{}{}", self.settings.api_url.trim_end_matches('/'), path);
        reqwest::Url::parse(&joined).map_err(|err| {
            TransportError::new(
                FailureKind::InvalidEndpoint,
                format!("Invalid API URL {joined}: {err}"),
            )
        })
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, TransportError> {
        let url = self.endpoint(path)?;
        let body = serde_json::to_vec(body).map_err(|err| {
            engine_warn!("Failed to encode request body for {}: {}", path, err);
            TransportError::new(FailureKind::Decode, GENERIC_FAILURE)
        })?;

        engine_debug!("POST {} ({} bytes)", url, body.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = self.read_body(response).await.unwrap_or_default();
        Err(classify_error_body(status.as_u16(), &body))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        let max_bytes = self.settings.max_body_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, payload: &RequestPayload) -> Result<ExtractionResponse, TransportError> {
        let mode = payload.mode();
        let response = self.post_json(endpoint_path(mode), payload).await?;
        let body = self.read_body(response).await?;
        decode_response(mode, &body)
    }

    async fn batch(&self, request: &BatchRequest) -> Result<BatchArchive, TransportError> {
        let response = self.post_json(BATCH_PATH, request).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = self.read_body(response).await?;
        Ok(BatchArchive {
            bytes,
            content_type,
        })
    }
}

/// Decodes a success body into the shape `mode` promises. A body that does
/// not fit is a transport failure, never a partial result.
pub fn decode_response(
    mode: ExtractionMode,
    body: &[u8],
) -> Result<ExtractionResponse, TransportError> {
    let decoded = match mode {
        ExtractionMode::Scrape => serde_json::from_slice(body).map(ExtractionResponse::Scrape),
        ExtractionMode::Crawl => serde_json::from_slice(body).map(ExtractionResponse::Crawl),
        ExtractionMode::Map => serde_json::from_slice(body).map(ExtractionResponse::Map),
        ExtractionMode::Search => serde_json::from_slice(body).map(ExtractionResponse::Search),
    };
    decoded.map_err(|err| {
        engine_warn!("Undecodable {} response ({} bytes): {}", mode, body.len(), err);
        TransportError::new(
            FailureKind::Decode,
            format!("{GENERIC_FAILURE}: unexpected response from the extraction service"),
        )
    })
}

/// Uses the service's `detail` string verbatim when there is one, otherwise a
/// status-coded message.
pub fn classify_error_body(status: u16, body: &[u8]) -> TransportError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .and_then(|detail| match detail {
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        });

    match detail {
        Some(detail) => {
            engine_warn!("Service error {}: {}", status, detail);
            TransportError::new(FailureKind::Service { status }, detail)
        }
        None => {
            engine_warn!("Server error {} without usable detail", status);
            TransportError::new(FailureKind::HttpStatus(status), format!("Server error: {status}"))
        }
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge { max_bytes, actual },
        format!("{GENERIC_FAILURE}: response larger than {max_bytes} bytes"),
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    engine_warn!("Transport failure: {}", err);
    if err.is_timeout() {
        return TransportError::new(
            FailureKind::Timeout,
            format!("{GENERIC_FAILURE}: the extraction service timed out"),
        );
    }
    TransportError::new(
        FailureKind::Network,
        format!("{GENERIC_FAILURE}: could not reach the extraction service"),
    )
}
