use serde::Serialize;

use super::alignment::{WordTiming, frame_at};

/// Where a key phrase first starts in the word timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseLocation {
    pub index: usize,
    pub start: f64,
    pub frame: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPhraseMatch {
    pub phrase: String,
    #[serde(rename = "match")]
    pub location: Option<PhraseLocation>,
}

impl KeyPhraseMatch {
    pub fn is_found(&self) -> bool {
        self.location.is_some()
    }
}

/// Index of the first word where `phrase` starts, using loose matching:
/// each timed word only has to contain the corresponding phrase word
/// (case-insensitive). A phrase running past the last word still matches on
/// the words that remain.
pub fn find_phrase(words: &[WordTiming], phrase: &str) -> Option<usize> {
    let lowered = phrase.to_lowercase();
    let phrase_words: Vec<&str> = lowered.split(' ').collect();
    let first = phrase_words.first()?;
    let lowered_words: Vec<String> = words.iter().map(|w| w.word.to_lowercase()).collect();

    (0..lowered_words.len()).find(|&i| {
        lowered_words[i].contains(first)
            && phrase_words
                .iter()
                .enumerate()
                .skip(1)
                .take_while(|(j, _)| i + j < lowered_words.len())
                .all(|(j, part)| lowered_words[i + j].contains(part))
    })
}

/// Runs [`find_phrase`] for every phrase, in order. Unmatched phrases are
/// reported, never treated as errors.
pub fn find_key_phrases<S: AsRef<str>>(words: &[WordTiming], phrases: &[S]) -> Vec<KeyPhraseMatch> {
    phrases
        .iter()
        .map(|phrase| {
            let phrase = phrase.as_ref();
            let location = find_phrase(words, phrase).map(|index| PhraseLocation {
                index,
                start: words[index].start,
                frame: frame_at(words[index].start),
            });
            KeyPhraseMatch {
                phrase: phrase.to_string(),
                location,
            }
        })
        .collect()
}
