use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::common::TestEnvironment;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Parse every stdout line as a JSON event (requires `--output json`)
    pub fn events(&self) -> Result<Vec<serde_json::Value>> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).with_context(|| format!("not a JSON event: {l}")))
            .collect()
    }

    pub fn event(&self, code: &str) -> Result<serde_json::Value> {
        self.events()?
            .into_iter()
            .find(|e| e["code"] == code)
            .with_context(|| format!("no event with code {code} in:\n{}", self.stdout))
    }
}

/// Run the voicesync binary against the environment's config and assets root.
/// The API key variable is always cleared so tests never reach the real service.
pub fn run_voicesync(env: &TestEnvironment, args: &[&str]) -> Result<CommandOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_voicesync"))
        .args(args)
        .arg("--config")
        .arg(env.config_path())
        .arg("--assets-root")
        .arg(env.assets_root())
        .arg("--no-color")
        .env_remove("ELEVENLABS_API_KEY")
        .current_dir(env.path())
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Build a synthesis response for `text` with 50ms per character.
pub fn synthetic_response(text: &str) -> serde_json::Value {
    let characters: Vec<String> = text.chars().map(|c| c.to_string()).collect();
    let n = characters.len();
    serde_json::json!({
        // "ID3" header bytes
        "audio_base64": "SUQzBAA=",
        "alignment": {
            "characters": characters,
            "character_start_times_seconds": (0..n).map(|i| i as f64 * 0.05).collect::<Vec<_>>(),
            "character_end_times_seconds": (0..n).map(|i| (i + 1) as f64 * 0.05).collect::<Vec<_>>(),
        }
    })
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(path.to_path_buf())
}

pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}
