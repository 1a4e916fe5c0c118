use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::paths;

use super::error::{VoiceoverError, VoiceoverResult};
use super::script::VOICE_ID;

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Voice parameters sent with every synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceoverConfig {
    /// ElevenLabs API key (the ELEVENLABS_API_KEY environment variable takes precedence)
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model: String,
    /// Voice consistency (0.0-1.0)
    pub stability: f64,
    pub similarity_boost: f64,
    /// Expressiveness (0.0-1.0)
    pub style: f64,
    pub use_speaker_boost: bool,
    pub output_format: String,
    /// Root of the video project's static assets; audio lands in <root>/audio
    pub assets_root: PathBuf,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub retry_delay_secs: u64,
}

impl Default for VoiceoverConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voice_id: VOICE_ID.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
            // Keep it chill, not too dramatic
            style: 0.3,
            use_speaker_boost: true,
            output_format: Self::DEFAULT_OUTPUT_FORMAT.to_string(),
            assets_root: PathBuf::from("public"),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
            retry_delay_secs: 2,
        }
    }
}

const FIELD_DOCS: &[(&str, &str)] = &[
    ("api_key", "ElevenLabs API key (ELEVENLABS_API_KEY overrides it)"),
    ("voice_id", "Voice used for the narration"),
    ("model", "Synthesis model identifier"),
    ("stability", "Voice consistency (0.0-1.0)"),
    ("similarity_boost", "Similarity to the original voice (0.0-1.0)"),
    ("style", "Expressiveness (0.0-1.0)"),
    ("use_speaker_boost", "Boost similarity to the speaker"),
    ("output_format", "Audio format requested from the service, e.g. mp3_44100_128"),
    ("assets_root", "Static assets root; artifacts are written to <assets_root>/audio"),
    ("base_url", "Text-to-speech API base URL"),
    ("request_timeout_secs", "Per-request timeout in seconds"),
    ("retry_delay_secs", "Delay before the single retry of a failed request"),
];

impl VoiceoverConfig {
    pub const DEFAULT_MODEL: &'static str = "eleven_turbo_v2_5";
    pub const DEFAULT_OUTPUT_FORMAT: &'static str = "mp3_44100_128";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elevenlabs.io";

    pub fn default_path() -> Result<PathBuf> {
        Ok(paths::voicesync_config_dir()?.join("voiceover.toml"))
    }

    /// Loads the config at `path`, or the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(Self::default_path()?),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading voiceover config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing voiceover config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be between 0.0 and 1.0, got {value}");
            }
        }
        if self.voice_id.trim().is_empty() {
            bail!("voice_id must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Writes the config with one `# description` comment per key; unset
    /// optional keys are written commented out.
    pub fn save_with_documentation(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let value = toml::Value::try_from(self).context("serializing voiceover config")?;
        let table = value
            .as_table()
            .context("voiceover config did not serialize to a table")?;
        let mut output = String::new();
        for (name, description) in FIELD_DOCS {
            match table.get(*name) {
                Some(value) => output.push_str(&format!("{name} = {value}  # {description}\n")),
                None => output.push_str(&format!("# {name} = \"\"  # {description}\n")),
            }
        }

        fs::write(path, output)
            .with_context(|| format!("writing voiceover config to {}", path.display()))?;
        Ok(())
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            style: self.style,
            use_speaker_boost: self.use_speaker_boost,
        }
    }

    /// File extension for the requested output format (`mp3_44100_128` -> `mp3`).
    pub fn audio_extension(&self) -> &str {
        self.output_format
            .split('_')
            .next()
            .filter(|ext| !ext.is_empty())
            .unwrap_or("mp3")
    }

    pub fn artifact_paths(&self) -> paths::ArtifactPaths {
        paths::ArtifactPaths::new(&self.assets_root, self.audio_extension())
    }

    /// Picks the API key: explicit flag, then environment, then config file.
    pub fn resolve_api_key(&self, flag: Option<&str>) -> VoiceoverResult<String> {
        flag.map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| self.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                VoiceoverError::synthesis(format!(
                    "API key not found. Set {API_KEY_ENV}, pass --api-key or add api_key to the config file"
                ))
            })
    }
}
