//! Debater personas.
//!
//! Both personas share one set of debate rules and differ only in their
//! description (stance and voice), so the system scripts are assembled from
//! configuration instead of being kept as separate literals.

use serde::{Deserialize, Serialize};

/// Which side of the debate is speaking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// Opens the debate and speaks on every even round.
    A,
    /// Responds first and speaks on every odd round.
    B,
}

impl Speaker {
    /// Speaker for a 0-based round index.
    pub fn for_round(round_index: usize) -> Self {
        if round_index % 2 == 0 {
            Speaker::A
        } else {
            Speaker::B
        }
    }
}

/// Display color hint for a persona's label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    #[default]
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

/// One debater's identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    /// Label prefixed to every turn this persona speaks (e.g. "Right").
    pub label: String,
    /// Who the persona is and which stance it argues.
    pub description: String,
    #[serde(default)]
    pub color: LabelColor,
}

impl Persona {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            color: LabelColor::Default,
        }
    }

    /// Set the label color.
    pub fn with_color(mut self, color: LabelColor) -> Self {
        self.color = color;
        self
    }
}

/// The two personas plus the rules they both follow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaSet {
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default = "default_persona_a")]
    pub a: Persona,
    #[serde(default = "default_persona_b")]
    pub b: Persona,
}

impl Default for PersonaSet {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            a: default_persona_a(),
            b: default_persona_b(),
        }
    }
}

impl PersonaSet {
    pub fn get(&self, speaker: Speaker) -> &Persona {
        match speaker {
            Speaker::A => &self.a,
            Speaker::B => &self.b,
        }
    }

    pub fn label(&self, speaker: Speaker) -> &str {
        &self.get(speaker).label
    }

    /// Full system-role script for a speaker: shared rules, then the persona.
    pub fn system_prompt(&self, speaker: Speaker) -> String {
        format!(
            "{}\n\nThe character you are playing:\n{}",
            self.rules.trim_end(),
            self.get(speaker).description.trim()
        )
    }

    /// Speaker whose label opens `text` as `"<label>:"`, if any.
    pub fn speaker_for_prefix(&self, text: &str) -> Option<Speaker> {
        [Speaker::A, Speaker::B].into_iter().find(|&speaker| {
            text.strip_prefix(self.label(speaker))
                .is_some_and(|rest| rest.starts_with(':'))
        })
    }
}

fn default_rules() -> String {
    DEFAULT_RULES.to_string()
}

fn default_persona_a() -> Persona {
    Persona::new("Right", DEFAULT_PERSONA_A).with_color(LabelColor::Blue)
}

fn default_persona_b() -> Persona {
    Persona::new("Left", DEFAULT_PERSONA_B).with_color(LabelColor::Red)
}

const DEFAULT_RULES: &str = r#"You are taking part in a structured debate.
Your goal is to convince the audience that you are right and to answer your opponent's arguments sharply and relevantly.

DEBATE RULES:
1. Stay on the topic of the debate.
2. Keep your responses concise and focused (at most 2-3 paragraphs).
3. Keep a respectful but firm tone. Attack the arguments, not the person in front of you.
4. Your response must address the last argument your opponent presented directly.
"#;

const DEFAULT_PERSONA_A: &str = "You are an Israeli man holding right-wing views. The year is 2025.
You must faithfully represent the right-wing worldview common in Israel.";

const DEFAULT_PERSONA_B: &str = "You are an Israeli woman holding left-wing views. The year is 2025.
You must faithfully represent the left-wing worldview common in Israel.";
