//! Centralized path management for voicesync
//! This module provides a single source of truth for all application and artifact paths

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const AUDIO_SUBDIR: &str = "audio";
pub const AUDIO_STEM: &str = "voiceover";
pub const TIMESTAMPS_FILE: &str = "timestamps.json";
pub const RESPONSE_FILE: &str = "response.json";
pub const CAPTIONS_FILE: &str = "captions.json";

/// Get the main voicesync config directory
pub fn voicesync_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("voicesync");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Paths of every artifact produced below one assets root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    audio_dir: PathBuf,
    audio_file: PathBuf,
    timestamps_file: PathBuf,
}

impl ArtifactPaths {
    pub fn new(assets_root: impl AsRef<Path>, audio_extension: &str) -> Self {
        let audio_dir = assets_root.as_ref().join(AUDIO_SUBDIR);
        Self {
            audio_file: audio_dir.join(format!("{AUDIO_STEM}.{audio_extension}")),
            timestamps_file: audio_dir.join(TIMESTAMPS_FILE),
            audio_dir,
        }
    }

    pub fn audio_file(&self) -> &Path {
        &self.audio_file
    }

    pub fn timestamps_file(&self) -> &Path {
        &self.timestamps_file
    }

    pub fn response_file(&self) -> PathBuf {
        self.audio_dir.join(RESPONSE_FILE)
    }
}

/// Sibling file next to a sidecar, falling back to the working directory
pub fn sibling_of(path: &Path, file_name: &str) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(file_name)
}
