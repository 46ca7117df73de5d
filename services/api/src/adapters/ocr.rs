//! services/api/src/adapters/ocr.rs
//!
//! This module contains the adapter for the external OCR service.
//! It implements the `OcrService` port from the `core` crate.

use async_trait::async_trait;
use dyslexia_core::ports::{OcrService, PortError, PortResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Posts images as multipart `file` uploads and reads back `{ "text": ... }`.
#[derive(Clone)]
pub struct HttpOcrAdapter {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
}

impl HttpOcrAdapter {
    /// Creates a new `HttpOcrAdapter`.
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

fn map_request_error(e: reqwest::Error) -> PortError {
    if e.is_connect() || e.is_timeout() {
        PortError::Unavailable(format!("OCR service is not reachable: {}", e))
    } else {
        PortError::Unexpected(e.to_string())
    }
}

//=========================================================================================
// `OcrService` Trait Implementation
//=========================================================================================

#[async_trait]
impl OcrService for HttpOcrAdapter {
    async fn recognize(&self, file_name: &str, content_type: &str, data: Vec<u8>) -> PortResult<String> {
        debug!("Sending {} ({} bytes) to OCR service", file_name, data.len());

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| PortError::InvalidInput(format!("invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OCR service answered {}: {}", status, body);
            return Err(PortError::Unexpected(format!(
                "OCR service returned {}: {}",
                status, body
            )));
        }

        let parsed: OcrResponse = response.json().await.map_err(map_request_error)?;
        Ok(parsed.text)
    }
}
