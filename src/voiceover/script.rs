//! Embedded narration and the markers used to place visuals against it.

/// Narration read by the voiceover. Ellipses are pacing cues for the
/// synthesizer; blank lines separate caption paragraphs.
pub const SCRIPT: &str = "My wife's parents have been in America for ten years.

They still don't think I've learned any Chinese.

And honestly... they're right. I haven't.

But they don't need to know that.

They just texted me... no idea what this says.

Oh look, another one. Still no clue.

But I know exactly what to do.

Unilingual keyboard... paste their message... translate.

Oh. That's what they meant. They're landing tomorrow.

Now I just type my response in English... hit translate...

Perfect Mandarin. Sent.

They're gonna think I've been studying this whole time.

Nah. I just got the cheat code.

Unilingual.";

/// Noah, chill conversationalist
pub const VOICE_ID: &str = "eZm9vdjYgL9PZKtf7XMM";

pub const KEY_PHRASES: &[&str] = &[
    "They just texted me",
    "another one",
    "what to do",
    "Unilingual keyboard",
    "translate",
    "That's what they meant",
    "type my response",
    "hit translate",
    "Sent",
    "cheat code",
    "Unilingual",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_has_fourteen_caption_paragraphs() {
        let paragraphs = SCRIPT
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        assert_eq!(paragraphs, 14);
    }

    #[test]
    fn every_key_phrase_word_occurs_in_script() {
        let lowered = SCRIPT.to_lowercase();
        for phrase in KEY_PHRASES {
            for word in phrase.to_lowercase().split(' ') {
                assert!(lowered.contains(word), "{word} missing from script");
            }
        }
    }
}
