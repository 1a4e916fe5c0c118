use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::alignment::{AlignmentResult, frame_at, is_separator_char, split_words};
use super::error::{VoiceoverError, VoiceoverResult};

/// One caption line and the frame range it stays on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionWindow {
    pub text: String,
    pub start_frame: u64,
    pub end_frame: u64,
    #[serde(skip)]
    pub start: f64,
    #[serde(skip)]
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub windows: Vec<CaptionWindow>,
    /// Timed words left over after every paragraph was assigned.
    pub unassigned_words: usize,
}

/// Blank-line separated paragraphs, inner line breaks folded into spaces.
pub fn paragraphs(script: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in script.lines() {
        let trimmed = line.trim_matches(is_separator_char);
        if trimmed.is_empty() {
            if !current.is_empty() {
                result.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(trimmed);
        }
    }

    if !current.is_empty() {
        result.push(current.join(" "));
    }

    result
}

/// Assigns consecutive word timings to each script paragraph by token count.
pub fn build_captions(alignment: &AlignmentResult) -> VoiceoverResult<CaptionTrack> {
    let mut windows = Vec::new();
    let mut cursor = 0;

    for text in paragraphs(&alignment.script) {
        let count = split_words(&text).count();
        let Some(slice) = alignment.words.get(cursor..cursor + count) else {
            return Err(VoiceoverError::AlignmentMismatch(format!(
                "paragraph {:?} needs {} words from position {}, but only {} remain",
                text,
                count,
                cursor,
                alignment.words.len().saturating_sub(cursor)
            )));
        };
        cursor += count;

        let (Some(first), Some(last)) = (slice.first(), slice.last()) else {
            continue;
        };
        windows.push(CaptionWindow {
            start_frame: frame_at(first.start),
            end_frame: frame_at(last.end),
            start: first.start,
            end: last.end,
            text,
        });
    }

    Ok(CaptionTrack {
        windows,
        unassigned_words: alignment.words.len() - cursor,
    })
}

/// `HH:MM:SS,mmm` as used by SRT cues.
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60,
        millis
    )
}

pub fn render_srt(windows: &[CaptionWindow]) -> String {
    let mut out = String::new();
    for (i, window) in windows.iter().enumerate() {
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_srt_timestamp(window.start),
            format_srt_timestamp(window.end)
        );
        let _ = writeln!(out, "{}", window.text);
        let _ = writeln!(out);
    }
    out
}
