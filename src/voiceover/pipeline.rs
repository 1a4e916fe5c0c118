use std::path::{Path, PathBuf};

use anyhow::Context;

use super::alignment::AlignmentResult;
use super::config::VoiceoverConfig;
use super::elevenlabs::{ElevenLabsClient, SynthesisRequest, SynthesisResponse};
use super::error::{VoiceoverError, VoiceoverResult};
use super::phrases::{KeyPhraseMatch, find_key_phrases};
use crate::common::fs::write_atomic;
use crate::common::paths::ArtifactPaths;
use crate::common::progress::{create_spinner, finish_spinner_with_success};
use crate::ui::prelude::{Level, emit};

/// Inputs for one extractor run. Nothing is read from process-wide state.
pub struct GenerateOptions<'a> {
    pub script: &'a str,
    pub key_phrases: &'a [&'a str],
    pub config: &'a VoiceoverConfig,
    pub api_key: String,
    /// Keep the raw service reply so `align` can re-run without the API
    pub save_response: bool,
}

/// What a successful run leaves on disk, plus the data the report prints.
#[derive(Debug, Clone)]
pub struct VoiceoverOutput {
    pub audio_path: PathBuf,
    pub timestamps_path: PathBuf,
    pub total_duration: f64,
    pub alignment: AlignmentResult,
    pub phrases: Vec<KeyPhraseMatch>,
}

pub async fn generate_voiceover(options: GenerateOptions<'_>) -> VoiceoverResult<VoiceoverOutput> {
    let config = options.config;
    let paths = config.artifact_paths();

    let client = ElevenLabsClient::new(config, options.api_key)?;
    let request = SynthesisRequest::from_config(options.script, config);

    let spinner = create_spinner(format!(
        "Synthesizing voiceover with voice {}...",
        config.voice_id
    ));
    let response = match client.synthesize(&request, &spinner).await {
        Ok(response) => {
            finish_spinner_with_success(spinner, "Synthesis complete");
            response
        }
        Err(err) => {
            spinner.finish_and_clear();
            return Err(err);
        }
    };

    if options.save_response {
        save_response(&response, &paths.response_file())?;
    }

    process_response(
        options.script,
        &response,
        &paths,
        options.key_phrases,
        true,
    )
}

/// Steps shared by `generate` and offline `align`: validate the reply,
/// persist audio (when asked), segment, persist the sidecar, scan phrases.
pub fn process_response(
    script: &str,
    response: &SynthesisResponse,
    paths: &ArtifactPaths,
    key_phrases: &[&str],
    write_audio: bool,
) -> VoiceoverResult<VoiceoverOutput> {
    let alignment = response.character_alignment()?;
    emit(
        Level::Debug,
        "voiceover.alignment.received",
        &format!("Received timings for {} characters", alignment.len()),
        None,
    );

    if write_audio {
        let audio = response.decode_audio()?;
        write_atomic(paths.audio_file(), &audio)
            .map_err(|e| VoiceoverError::filesystem(paths.audio_file(), e))?;
        emit(
            Level::Success,
            "voiceover.audio.saved",
            &format!("Audio saved to {}", paths.audio_file().display()),
            Some(serde_json::json!({ "path": paths.audio_file(), "bytes": audio.len() })),
        );
    }

    let result = AlignmentResult::from_alignment(script, &alignment)?;
    write_sidecar(&result, paths.timestamps_file())?;
    emit(
        Level::Success,
        "voiceover.timestamps.saved",
        &format!("Timestamps saved to {}", paths.timestamps_file().display()),
        Some(serde_json::json!({ "path": paths.timestamps_file() })),
    );

    let phrases = find_key_phrases(&result.words, key_phrases);

    Ok(VoiceoverOutput {
        audio_path: paths.audio_file().to_path_buf(),
        timestamps_path: paths.timestamps_file().to_path_buf(),
        total_duration: result.total_duration,
        alignment: result,
        phrases,
    })
}

pub fn write_sidecar(result: &AlignmentResult, path: &Path) -> VoiceoverResult<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| VoiceoverError::filesystem(path, std::io::Error::other(e)))?;
    write_atomic(path, json.as_bytes()).map_err(|e| VoiceoverError::filesystem(path, e))
}

pub fn read_sidecar(path: &Path) -> anyhow::Result<AlignmentResult> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| VoiceoverError::filesystem(path, e))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid timestamps file {}", path.display()))
}

fn save_response(response: &SynthesisResponse, path: &Path) -> VoiceoverResult<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| VoiceoverError::filesystem(path, std::io::Error::other(e)))?;
    write_atomic(path, json.as_bytes()).map_err(|e| VoiceoverError::filesystem(path, e))?;
    emit(
        Level::Info,
        "voiceover.response.saved",
        &format!("Raw synthesis response saved to {}", path.display()),
        None,
    );
    Ok(())
}

pub fn load_response(path: &Path) -> VoiceoverResult<SynthesisResponse> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| VoiceoverError::filesystem(path, e))?;
    SynthesisResponse::parse(&contents)
}
