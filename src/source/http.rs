//! HTTP backend.
//!
//! Downloads `<base>/<database>/<collection>` and decodes the body as a
//! JSON array or newline-delimited JSON.

use super::{parse_documents, redact, SourceError, SourceOptions, SurveySource};
use crate::models::SurveyRecord;
use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on the buffer reserved up front from `Content-Length`.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Survey documents served over HTTP.
pub struct HttpSource {
    url: String,
    timeout_seconds: u64,
    show_progress: bool,
    http_client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: &str, options: &SourceOptions) -> Result<Self, SourceError> {
        let url = format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            options.database,
            options.collection
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            url,
            timeout_seconds: options.timeout_seconds,
            show_progress: options.show_progress,
            http_client,
        })
    }

    fn progress_bar(&self, length: Option<u64>) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = match length {
            Some(len) => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        Some(pb)
    }
}

/// Buffer size to reserve for a body of the advertised length.
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.unwrap_or(0).min(MAX_PREALLOCATION) as usize
}

#[async_trait]
impl SurveySource for HttpSource {
    fn describe(&self) -> String {
        redact(&self.url)
    }

    async fn fetch(&self) -> Result<Vec<SurveyRecord>, SourceError> {
        info!("Downloading survey documents from {}", self.describe());

        let response = self.http_client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                debug!("Request timed out after {}s", self.timeout_seconds);
            }
            SourceError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.describe(),
            });
        }

        let progress = self.progress_bar(response.content_length());
        let mut body = Vec::with_capacity(initial_capacity(response.content_length()));
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            body.extend_from_slice(&chunk);
            if let Some(ref pb) = progress {
                pb.set_position(body.len() as u64);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        debug!("Downloaded {} bytes", body.len());

        let text = String::from_utf8(body)?;
        parse_documents(&text)
    }
}
