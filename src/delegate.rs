//! Hand-off to the external audio-transcription (Whisper) service.
//!
//! Used for videos without captions. The service downloads the audio itself,
//! so only the URL is forwarded and the reply is relayed unchanged.

use crate::cancel::bounded;
use crate::config::WhisperSettings;
use crate::error::{Result, TubescribeError};
use crate::http::join_url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const SERVICE_NAME: &str = "Transcription service";
const START_HINT: &str =
    "Start the audio transcription service (listening on whisper.base_url, default port 8001)";
const FALLBACK_DETAIL: &str = "Failed to transcribe video";

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Client for the transcription service.
pub struct TranscriptionDelegate {
    client: reqwest::Client,
    transcribe_url: String,
    health_url: String,
    probe_before_request: bool,
    probe_timeout: Duration,
    timeout: Duration,
}

impl TranscriptionDelegate {
    pub fn new(client: reqwest::Client, settings: &WhisperSettings) -> Self {
        Self {
            client,
            transcribe_url: join_url(&settings.base_url, &settings.transcribe_path),
            health_url: join_url(&settings.base_url, &settings.health_path),
            probe_before_request: settings.probe_before_request,
            probe_timeout: Duration::from_secs(settings.probe_timeout_secs),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn transcribe_url(&self) -> &str {
        &self.transcribe_url
    }

    fn unavailable(detail: impl Into<String>) -> TubescribeError {
        TubescribeError::ServiceUnavailable {
            service: SERVICE_NAME.to_string(),
            detail: detail.into(),
            hint: START_HINT.to_string(),
        }
    }

    /// Check that the service answers on its health path.
    #[instrument(skip(self, cancel), fields(url = %self.health_url))]
    pub async fn probe(&self, cancel: &CancellationToken) -> Result<()> {
        match bounded(
            cancel,
            self.probe_timeout,
            "transcription service health check",
            self.send_probe(),
        )
        .await
        {
            Err(TubescribeError::Timeout(detail)) => Err(Self::unavailable(detail)),
            other => other,
        }
    }

    /// Forward `url` to the service and relay its JSON reply.
    #[instrument(skip(self, cancel))]
    pub async fn transcribe(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value> {
        if self.probe_before_request {
            self.probe(cancel).await?;
        } else {
            debug!("Skipping transcription service probe");
        }

        info!("Forwarding to {}", self.transcribe_url);
        let payload = bounded(
            cancel,
            self.timeout,
            "audio transcription",
            self.send(url),
        )
        .await?;

        info!("Transcription service replied");
        Ok(payload)
    }

    async fn send_probe(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| Self::unavailable(format!("cannot reach {}: {}", self.health_url, e)))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn send(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(&self.transcribe_url)
            .json(&TranscribeRequest { url })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Self::unavailable(format!("cannot reach {}: {}", self.transcribe_url, e))
                } else {
                    TubescribeError::DelegateFailure(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TubescribeError::DelegateFailure(format!("failed to read response: {}", e))
        })?;

        parse_delegate_response(status, &body)
    }
}

/// Interpret the service reply.
///
/// Failure bodies look like `{"detail": "..."}`; anything else collapses to a
/// generic message.
pub fn parse_delegate_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<serde_json::Value> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_string))
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_DETAIL.to_string());
        warn!("Transcription service returned {}: {}", status, detail);
        return Err(TubescribeError::DelegateFailure(detail));
    }

    serde_json::from_str(body).map_err(|e| {
        TubescribeError::DelegateFailure(format!("malformed response from service: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_success_is_relayed_unchanged() {
        let body = r#"{"status":"success","transcription":"hello there","extra":[1,2]}"#;
        let value = parse_delegate_response(StatusCode::OK, body).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["transcription"], "hello there");
        assert_eq!(value["extra"][1], 2);
    }

    #[test]
    fn test_error_detail_is_extracted() {
        let body = r#"{"detail":"Video is private"}"#;
        let err = parse_delegate_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        match err {
            TubescribeError::DelegateFailure(detail) => assert_eq!(detail, "Video is private"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_without_detail_uses_fallback() {
        for body in ["", "<html>bad gateway</html>", r#"{"detail":[{"loc":["body"]}]}"#] {
            let err = parse_delegate_response(StatusCode::BAD_GATEWAY, body).unwrap_err();
            match err {
                TubescribeError::DelegateFailure(detail) => assert_eq!(detail, FALLBACK_DETAIL),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_success_body() {
        let err = parse_delegate_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, TubescribeError::DelegateFailure(_)));
    }

    #[test]
    fn test_urls_are_joined() {
        let delegate = TranscriptionDelegate::new(
            crate::http::create_client().unwrap(),
            &WhisperSettings {
                base_url: "http://localhost:8001/".to_string(),
                ..WhisperSettings::default()
            },
        );
        assert_eq!(delegate.transcribe_url(), "http://localhost:8001/transcribe");
        assert_eq!(delegate.health_url, "http://localhost:8001/docs");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let delegate = TranscriptionDelegate::new(
            crate::http::create_client().unwrap(),
            &WhisperSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                probe_timeout_secs: 2,
                ..WhisperSettings::default()
            },
        );

        let err = delegate
            .transcribe("https://youtu.be/dQw4w9WgXcQ", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TubescribeError::ServiceUnavailable { .. }));
    }
}
