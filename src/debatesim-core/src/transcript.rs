//! Debate transcript and its flattened text form.

use serde::{Deserialize, Serialize};

use crate::persona::{PersonaSet, Speaker};

/// Reserved sentinel delimiting turns in a flattened transcript.
pub const TURN_SEPARATOR: &str = "---DEBATE_TURN_SEPARATOR---";

/// One persona's contribution to the debate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    /// Label the turn is rendered under.
    pub label: String,
    pub content: String,
    /// Set when the backend failed and `content` is the fallback notice.
    #[serde(default)]
    pub failed: bool,
}

impl Turn {
    pub fn spoken(speaker: Speaker, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker,
            label: label.into(),
            content: content.into(),
            failed: false,
        }
    }

    /// Fallback turn recorded when a speaker's completion failed.
    pub fn failure(speaker: Speaker, label: impl Into<String>) -> Self {
        let label = label.into();
        let content = format!("{} encountered an error and cannot continue", label);
        Self {
            speaker,
            label,
            content,
            failed: true,
        }
    }

    /// `"<label>: <content>"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.label, self.content)
    }
}

/// Ordered turns of one simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// True when the run stopped on a backend failure.
    pub fn ended_early(&self) -> bool {
        self.turns.last().is_some_and(|t| t.failed)
    }

    /// Rendered turns with [`TURN_SEPARATOR`] between consecutive entries.
    ///
    /// No separator follows the last entry, whether the run completed or
    /// stopped on a failure.
    pub fn display_history(&self) -> Vec<String> {
        let mut history = Vec::with_capacity(self.turns.len() * 2);
        for (i, turn) in self.turns.iter().enumerate() {
            if i > 0 {
                history.push(TURN_SEPARATOR.to_string());
            }
            history.push(turn.render());
        }
        history
    }

    /// Display history joined by newlines, ready for a renderer.
    pub fn to_text(&self) -> String {
        self.display_history().join("\n")
    }
}

/// A separator-delimited chunk of transcript text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptBlock {
    /// Speaker recognized from a leading `"<label>:"`, if any.
    pub speaker: Option<Speaker>,
    /// `"<label>:"` when a speaker was recognized, otherwise empty.
    pub prefix: String,
    pub body: String,
}

/// Split flattened transcript text back into blocks, dropping empty ones.
pub fn split_blocks(text: &str, personas: &PersonaSet) -> Vec<TranscriptBlock> {
    text.split(TURN_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| match personas.speaker_for_prefix(block) {
            Some(speaker) => {
                let prefix_len = personas.label(speaker).len() + 1;
                TranscriptBlock {
                    speaker: Some(speaker),
                    prefix: block[..prefix_len].to_string(),
                    body: block[prefix_len..].to_string(),
                }
            }
            None => TranscriptBlock {
                speaker: None,
                prefix: String::new(),
                body: block.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Turn::spoken(Speaker::A, "Right", "R1"));
        transcript.push(Turn::spoken(Speaker::B, "Left", "R2"));
        transcript
    }

    #[test]
    fn test_display_history_separates_between_turns() {
        assert_eq!(
            sample().display_history(),
            vec!["Right: R1", TURN_SEPARATOR, "Left: R2"]
        );
    }

    #[test]
    fn test_failure_turn_text() {
        let turn = Turn::failure(Speaker::B, "Left");
        assert_eq!(turn.render(), "Left: Left encountered an error and cannot continue");
        assert!(turn.failed);

        let mut transcript = sample();
        assert!(!transcript.ended_early());
        transcript.push(turn);
        assert!(transcript.ended_early());
    }

    #[test]
    fn test_split_blocks_recognizes_speakers() {
        let personas = PersonaSet::default();
        let text = format!(
            "{}\nNarrator: intro\n{}\n",
            sample().to_text(),
            TURN_SEPARATOR
        );
        let blocks = split_blocks(&text, &personas);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].speaker, Some(Speaker::A));
        assert_eq!(blocks[0].prefix, "Right:");
        assert_eq!(blocks[0].body, " R1");
        assert_eq!(blocks[1].speaker, Some(Speaker::B));
        assert_eq!(blocks[1].body, " R2\nNarrator: intro");
    }

    #[test]
    fn test_split_blocks_unlabelled_text() {
        let personas = PersonaSet::default();
        let blocks = split_blocks("just some words", &personas);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].speaker, None);
        assert!(blocks[0].prefix.is_empty());
        assert_eq!(blocks[0].body, "just some words");
    }
}
