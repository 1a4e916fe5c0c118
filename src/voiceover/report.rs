use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

use super::alignment::AlignmentResult;
use super::captions::CaptionWindow;
use super::phrases::KeyPhraseMatch;
use crate::ui::prelude::*;

pub fn show_summary(result: &AlignmentResult) {
    emit(
        Level::Info,
        "voiceover.stats",
        &format!(
            "\n{}\n   Duration: {:.2}s\n   Words: {}\n   Frames (at {}fps): {}",
            "Stats:".bold(),
            result.total_duration,
            result.words.len(),
            result.fps,
            result.total_frames
        ),
        Some(serde_json::json!({
            "totalDuration": result.total_duration,
            "words": result.words.len(),
            "fps": result.fps,
            "totalFrames": result.total_frames,
        })),
    );
}

pub fn phrase_table(matches: &[KeyPhraseMatch]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Phrase", "Word #", "Start", "Frame"]);

    for m in matches {
        match &m.location {
            Some(loc) => table.add_row(vec![
                Cell::new(format!("\"{}\"", m.phrase)),
                Cell::new(loc.index),
                Cell::new(format!("{:.2}s", loc.start)),
                Cell::new(loc.frame),
            ]),
            None => table.add_row(vec![
                Cell::new(format!("\"{}\"", m.phrase)),
                Cell::new("-"),
                Cell::new("not found"),
                Cell::new("-"),
            ]),
        };
    }

    table
}

/// Key phrase lookup for placing visuals. Unmatched phrases are listed, not
/// treated as failures.
pub fn show_phrases(matches: &[KeyPhraseMatch]) {
    match get_output_format() {
        OutputFormat::Json => {
            for m in matches {
                let message = match &m.location {
                    Some(loc) => format!(
                        "\"{}\" → {:.2}s (frame {})",
                        m.phrase, loc.start, loc.frame
                    ),
                    None => format!("\"{}\" not found", m.phrase),
                };
                emit(
                    Level::Info,
                    "voiceover.phrase",
                    &message,
                    serde_json::to_value(m).ok(),
                );
            }
        }
        OutputFormat::Text => {
            println!("\n{}", "Key phrases for visual sync:".bold());
            print_block(&phrase_table(matches).to_string());
        }
    }

    let missing = matches.iter().filter(|m| !m.is_found()).count();
    if missing > 0 {
        emit(
            Level::Warn,
            "voiceover.phrase.missing",
            &format!("{missing} key phrase(s) not found in the word timings"),
            None,
        );
    }
}

pub fn caption_table(windows: &[CaptionWindow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Caption", "Start frame", "End frame"]);
    for (i, window) in windows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&window.text),
            Cell::new(window.start_frame),
            Cell::new(window.end_frame),
        ]);
    }
    table
}

pub fn show_captions(windows: &[CaptionWindow]) {
    match get_output_format() {
        OutputFormat::Json => emit(
            Level::Info,
            "voiceover.captions",
            &format!("{} caption windows", windows.len()),
            serde_json::to_value(windows).ok(),
        ),
        OutputFormat::Text => print_block(&caption_table(windows).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voiceover::phrases::PhraseLocation;

    #[test]
    fn phrase_table_marks_missing_phrases() {
        let matches = vec![
            KeyPhraseMatch {
                phrase: "hit translate".into(),
                location: Some(PhraseLocation {
                    index: 120,
                    start: 33.47,
                    frame: 1004,
                }),
            },
            KeyPhraseMatch {
                phrase: "cheat sheet".into(),
                location: None,
            },
        ];
        let rendered = phrase_table(&matches).to_string();
        assert!(rendered.contains("\"hit translate\""));
        assert!(rendered.contains("33.47s"));
        assert!(rendered.contains("1004"));
        assert!(rendered.contains("not found"));
    }
}
