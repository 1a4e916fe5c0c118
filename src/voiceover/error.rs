use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceoverError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Synthesis returned no timed characters")]
    EmptyInput,

    #[error("Word timings do not match the script: {0}")]
    AlignmentMismatch(String),
}

impl VoiceoverError {
    pub fn synthesis(message: impl Into<String>) -> Self {
        VoiceoverError::Synthesis(message.into())
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VoiceoverError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type VoiceoverResult<T> = std::result::Result<T, VoiceoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_error_names_path() {
        let err = VoiceoverError::filesystem(
            "public/audio/voiceover.mp3",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("public/audio/voiceover.mp3"));
        assert!(msg.contains("denied"));
    }
}
