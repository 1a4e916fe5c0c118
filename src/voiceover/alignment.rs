//! Character-to-word timing reduction and the persisted alignment artifact.
//!
//! The synthesis service reports one timing per character. Everything the
//! video timeline needs is derived from that batch here:
//! - word timings (whitespace-delimited runs of characters)
//! - total duration (end of the final character)
//! - frame count at the fixed render rate

use serde::{Deserialize, Serialize};

use super::error::{VoiceoverError, VoiceoverResult};

/// Frame rate the downstream renderer assumes. Not configurable.
pub const FPS: u32 = 30;

/// A single synthesized character with its timing in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterTiming {
    pub character: String,
    pub start: f64,
    pub end: f64,
}

/// Validated, ordered character timings for one synthesis call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterAlignment {
    characters: Vec<CharacterTiming>,
}

impl CharacterAlignment {
    /// Zips the three parallel arrays returned by the service, rejecting
    /// mismatched lengths and non-finite or negative times.
    pub fn from_parallel(
        characters: Vec<String>,
        starts: Vec<f64>,
        ends: Vec<f64>,
    ) -> VoiceoverResult<Self> {
        if characters.len() != starts.len() || characters.len() != ends.len() {
            return Err(VoiceoverError::synthesis(format!(
                "alignment arrays differ in length (characters: {}, start times: {}, end times: {})",
                characters.len(),
                starts.len(),
                ends.len()
            )));
        }

        let mut timings = Vec::with_capacity(characters.len());
        for (index, ((character, start), end)) in
            characters.into_iter().zip(starts).zip(ends).enumerate()
        {
            if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
                return Err(VoiceoverError::synthesis(format!(
                    "invalid timing for character {index} ({character:?}): {start}..{end}"
                )));
            }
            timings.push(CharacterTiming {
                character,
                start,
                end,
            });
        }

        Ok(Self {
            characters: timings,
        })
    }

    pub fn characters(&self) -> &[CharacterTiming] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// End time of the final character, or `EmptyInput` for an empty batch.
    pub fn total_duration(&self) -> VoiceoverResult<f64> {
        self.characters
            .last()
            .map(|c| c.end)
            .ok_or(VoiceoverError::EmptyInput)
    }
}

/// A single word with its timing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// The sidecar written next to the voiceover audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResult {
    pub script: String,
    pub words: Vec<WordTiming>,
    pub total_duration: f64,
    pub fps: u32,
    pub total_frames: u64,
}

impl AlignmentResult {
    pub fn from_alignment(script: &str, alignment: &CharacterAlignment) -> VoiceoverResult<Self> {
        if alignment.is_empty() {
            return Err(VoiceoverError::EmptyInput);
        }
        let total_duration = alignment.total_duration()?;
        Ok(Self {
            script: script.to_string(),
            words: segment_words(alignment.characters()),
            total_duration,
            fps: FPS,
            total_frames: total_frames(total_duration),
        })
    }
}

pub fn is_separator(character: &str) -> bool {
    let mut chars = character.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_separator_char(c))
}

pub fn is_separator_char(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

/// Splits plain text into the same tokens `segment_words` produces from
/// timed characters.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator_char).filter(|token| !token.is_empty())
}

/// Groups character timings into whitespace-delimited words in one
/// left-to-right pass. Runs of separators never yield empty words.
pub fn segment_words(characters: &[CharacterTiming]) -> Vec<WordTiming> {
    let mut words = Vec::new();
    let mut current_word = String::new();
    let mut word_start = 0.0;

    for (i, timing) in characters.iter().enumerate() {
        if is_separator(&timing.character) {
            if !current_word.is_empty() {
                // A non-empty buffer means the previous character was part of it
                words.push(WordTiming {
                    word: std::mem::take(&mut current_word),
                    start: word_start,
                    end: characters[i - 1].end,
                });
            }
        } else {
            if current_word.is_empty() {
                word_start = timing.start;
            }
            current_word.push_str(&timing.character);
        }
    }

    if !current_word.is_empty()
        && let Some(last) = characters.last()
    {
        words.push(WordTiming {
            word: current_word,
            start: word_start,
            end: last.end,
        });
    }

    words
}

/// Frames needed to cover `duration` seconds at [`FPS`], rounded up.
pub fn total_frames(duration: f64) -> u64 {
    if duration <= 0.0 {
        return 0;
    }
    (duration * f64::from(FPS)).ceil() as u64
}

/// Nearest frame for a timestamp, as used when hand-placing visuals.
pub fn frame_at(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * f64::from(FPS)).round() as u64
}

#[cfg(test)]
pub(crate) fn timings_from(text: &str, times: &[(f64, f64)]) -> CharacterAlignment {
    let characters: Vec<String> = text.chars().map(|c| c.to_string()).collect();
    let starts = times.iter().map(|t| t.0).collect();
    let ends = times.iter().map(|t| t.1).collect();
    CharacterAlignment::from_parallel(characters, starts, ends).expect("valid alignment")
}

/// Evenly spaced timings, 0.1s per character.
#[cfg(test)]
pub(crate) fn uniform_timings(text: &str) -> CharacterAlignment {
    let times: Vec<(f64, f64)> = (0..text.chars().count())
        .map(|i| (i as f64 * 0.1, (i + 1) as f64 * 0.1))
        .collect();
    timings_from(text, &times)
}
