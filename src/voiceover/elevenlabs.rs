//! ElevenLabs text-to-speech with character timestamps.
//!
//! One request per run: the narration goes out, base64 audio and three
//! parallel timing arrays come back. The reply is validated here so the rest
//! of the pipeline only ever sees a [`CharacterAlignment`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use indicatif::ProgressBar;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use super::alignment::CharacterAlignment;
use super::config::{VoiceSettings, VoiceoverConfig};
use super::error::{VoiceoverError, VoiceoverResult};
use crate::common::progress::emit_above;
use crate::ui::prelude::Level;

const API_KEY_HEADER: &str = "xi-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything sent for one synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model: String,
    pub voice_settings: VoiceSettings,
    pub output_format: String,
}

impl SynthesisRequest {
    pub fn from_config(text: &str, config: &VoiceoverConfig) -> Self {
        Self {
            text: text.to_string(),
            voice_id: config.voice_id.clone(),
            model: config.model.clone(),
            voice_settings: config.voice_settings(),
            output_format: config.output_format.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// Wire shape of the `/with-timestamps` reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisResponse {
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub alignment: Option<RawAlignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAlignment {
    pub characters: Vec<String>,
    pub character_start_times_seconds: Vec<f64>,
    pub character_end_times_seconds: Vec<f64>,
}

impl SynthesisResponse {
    pub fn parse(json: &str) -> VoiceoverResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| VoiceoverError::synthesis(format!("malformed response: {e}")))
    }

    pub fn character_alignment(&self) -> VoiceoverResult<CharacterAlignment> {
        let raw = self
            .alignment
            .clone()
            .ok_or_else(|| VoiceoverError::synthesis("response has no alignment data"))?;
        CharacterAlignment::from_parallel(
            raw.characters,
            raw.character_start_times_seconds,
            raw.character_end_times_seconds,
        )
    }

    pub fn decode_audio(&self) -> VoiceoverResult<Vec<u8>> {
        let encoded = self
            .audio_base64
            .as_deref()
            .ok_or_else(|| VoiceoverError::synthesis("response has no audio payload"))?;
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                VoiceoverError::synthesis(format!("audio payload is not valid base64: {e}"))
            })
    }
}

/// Failure of one attempt, tagged with whether a retry could help.
struct AttemptError {
    error: VoiceoverError,
    retryable: bool,
}

impl AttemptError {
    fn fatal(error: VoiceoverError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

/// Client scoped to a single run; built from explicit configuration.
pub struct ElevenLabsClient {
    http: Client,
    api_key: String,
    base_url: String,
    retry_delay: Duration,
}

impl ElevenLabsClient {
    pub fn new(config: &VoiceoverConfig, api_key: String) -> VoiceoverResult<Self> {
        let http = Client::builder()
            .user_agent(format!("voicesync/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceoverError::synthesis(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}/with-timestamps", self.base_url, voice_id)
    }

    /// Synthesizes `request`, retrying once on transport errors, timeouts,
    /// rate limiting and server errors. Messages are printed above `progress`.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
        progress: &ProgressBar,
    ) -> VoiceoverResult<SynthesisResponse> {
        match self.attempt(request, progress).await {
            Ok(response) => Ok(response),
            Err(first) if first.retryable => {
                emit_above(
                    progress,
                    Level::Warn,
                    "voiceover.synthesis.retry",
                    &format!(
                        "{}; retrying once in {}s",
                        first.error,
                        self.retry_delay.as_secs()
                    ),
                );
                progress.set_message(format!("{} (retrying)", progress.message()));
                sleep(self.retry_delay).await;
                self.attempt(request, progress)
                    .await
                    .map_err(|second| second.error)
            }
            Err(first) => Err(first.error),
        }
    }

    async fn attempt(
        &self,
        request: &SynthesisRequest,
        progress: &ProgressBar,
    ) -> Result<SynthesisResponse, AttemptError> {
        let body = RequestBody {
            text: &request.text,
            model_id: &request.model,
            voice_settings: &request.voice_settings,
        };

        emit_above(
            progress,
            Level::Debug,
            "voiceover.synthesis.request",
            &format!(
                "POST {} (model {}, {} characters)",
                self.endpoint(&request.voice_id),
                request.model,
                request.text.chars().count()
            ),
        );

        let resp = self
            .http
            .post(self.endpoint(&request.voice_id))
            .query(&[("output_format", request.output_format.as_str())])
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptError {
                retryable: e.is_timeout() || e.is_connect() || e.is_request(),
                error: VoiceoverError::synthesis(format!(
                    "failed to reach text-to-speech service: {e}"
                )),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AttemptError {
                retryable: is_retryable_status(status),
                error: VoiceoverError::synthesis(format!(
                    "text-to-speech API error ({status}): {text}"
                )),
            });
        }

        let text = resp.text().await.map_err(|e| AttemptError {
            retryable: e.is_timeout(),
            error: VoiceoverError::synthesis(format!("failed to read response body: {e}")),
        })?;

        SynthesisResponse::parse(&text).map_err(AttemptError::fatal)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const GOOD_BODY: &str = r#"{
        "audio_base64": "SUQzBAA=",
        "alignment": {
            "characters": ["a", " ", "b"],
            "character_start_times_seconds": [0.0, 0.1, 0.1],
            "character_end_times_seconds": [0.1, 0.1, 0.3]
        },
        "normalized_alignment": null
    }"#;

    /// Serves canned HTTP responses in order, one per connection, and
    /// records every request it saw.
    async fn serve(
        responses: Vec<(u16, &'static str)>,
    ) -> (
        String,
        Arc<AtomicUsize>,
        tokio::task::JoinHandle<Vec<String>>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.expect("accept");
                counter.fetch_add(1, Ordering::SeqCst);
                seen.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.expect("write");
                socket.shutdown().await.ok();
            }
            seen
        });

        (format!("http://{addr}"), hits, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn test_client(base_url: String) -> ElevenLabsClient {
        let config = VoiceoverConfig {
            base_url,
            retry_delay_secs: 0,
            request_timeout_secs: 5,
            ..VoiceoverConfig::default()
        };
        ElevenLabsClient::new(&config, "test-key".into()).expect("client")
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest::from_config("a b", &VoiceoverConfig::default())
    }

    #[test]
    fn valid_response_decodes_audio_and_alignment() {
        let response = SynthesisResponse::parse(GOOD_BODY).expect("parse");
        assert_eq!(response.decode_audio().expect("audio"), b"ID3\x04\x00");
        assert_eq!(response.character_alignment().expect("alignment").len(), 3);
    }

    #[test]
    fn missing_alignment_is_rejected() {
        let response = SynthesisResponse::parse(r#"{"audio_base64": "SUQz"}"#).expect("parse");
        let err = response.character_alignment().expect_err("no alignment");
        assert!(err.to_string().contains("no alignment"));
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let response = SynthesisResponse::parse(
            r#"{"audio_base64": "SUQz", "alignment": {
                "characters": ["a", "b"],
                "character_start_times_seconds": [0.0],
                "character_end_times_seconds": [0.1, 0.2]}}"#,
        )
        .expect("parse");
        assert!(matches!(
            response.character_alignment(),
            Err(VoiceoverError::Synthesis(_))
        ));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let mut response = SynthesisResponse::parse(GOOD_BODY).expect("parse");
        response.audio_base64 = Some("not base64!".into());
        assert!(matches!(
            response.decode_audio(),
            Err(VoiceoverError::Synthesis(_))
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = SynthesisResponse::parse("<html>").expect_err("not json");
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn sends_key_model_and_settings() {
        let (base_url, hits, handle) = serve(vec![(200, GOOD_BODY)]).await;
        let response = test_client(base_url)
            .synthesize(&request(), &ProgressBar::hidden())
            .await
            .expect("synthesize");

        assert!(response.alignment.is_some());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let seen = handle.await.expect("server");
        let raw = seen[0].to_ascii_lowercase();
        assert!(raw.starts_with("post /v1/text-to-speech/ezm9vdjyg"));
        assert!(raw.contains("output_format=mp3_44100_128"));
        assert!(raw.contains("xi-api-key: test-key"));
        assert!(raw.contains("\"model_id\":\"eleven_turbo_v2_5\""));
        assert!(raw.contains("\"use_speaker_boost\":true"));
    }

    #[tokio::test]
    async fn retries_once_after_server_error() {
        let (base_url, hits, handle) =
            serve(vec![(503, r#"{"detail":"busy"}"#), (200, GOOD_BODY)]).await;
        let response = test_client(base_url)
            .synthesize(&request(), &ProgressBar::hidden())
            .await
            .expect("second attempt succeeds");

        assert!(response.audio_base64.is_some());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        handle.await.expect("server");
    }

    #[tokio::test]
    async fn retry_keeps_spinner_running() {
        let (base_url, _hits, handle) = serve(vec![(429, "{}"), (200, GOOD_BODY)]).await;
        let spinner = ProgressBar::hidden();
        spinner.set_message("Synthesizing voiceover");
        test_client(base_url)
            .synthesize(&request(), &spinner)
            .await
            .expect("second attempt succeeds");

        assert!(!spinner.is_finished());
        assert_eq!(spinner.message(), "Synthesizing voiceover (retrying)");
        handle.await.expect("server");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (base_url, hits, handle) = serve(vec![(401, r#"{"detail":"invalid key"}"#)]).await;
        let err = test_client(base_url)
            .synthesize(&request(), &ProgressBar::hidden())
            .await
            .expect_err("unauthorized");

        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid key"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        handle.await.expect("server");
    }

    #[tokio::test]
    async fn gives_up_after_second_failure() {
        let (base_url, hits, handle) =
            serve(vec![(500, "{}"), (502, r#"{"detail":"still down"}"#)]).await;
        let err = test_client(base_url)
            .synthesize(&request(), &ProgressBar::hidden())
            .await
            .expect_err("both attempts fail");

        assert!(err.to_string().contains("still down"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        handle.await.expect("server");
    }
}
