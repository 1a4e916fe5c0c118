use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working area for one test: assets root and config file live in
/// a temp directory that is removed on drop.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        Ok(Self { temp_dir })
    }

    /// Get the temp directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn assets_root(&self) -> PathBuf {
        self.path().join("public")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("voiceover.toml")
    }

    pub fn timestamps_path(&self) -> PathBuf {
        self.assets_root().join("audio").join("timestamps.json")
    }

    /// Write a config file for this environment
    pub fn write_config(&self, contents: &str) -> Result<()> {
        std::fs::write(self.config_path(), contents)?;
        Ok(())
    }
}
