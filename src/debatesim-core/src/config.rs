//! Configuration module for loading TOML (or JSON) config files.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::completion::DEFAULT_TEMPERATURE;
use crate::error::DebateError;
use crate::persona::PersonaSet;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend model every completion call targets.
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// OpenAI-compatible API base URL.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub personas: PersonaSet,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub subject: SubjectConfig,
}

/// Per-turn user prompt templates.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptsConfig {
    /// First turn; `{subject}` is replaced with the debate subject.
    pub opening: String,
    /// Every later turn; `{last_argument}` is replaced with the previous reply.
    pub rebuttal: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            opening: "State your position on the topic: {subject}".to_string(),
            rebuttal: "Respond to the other side's last argument: {last_argument}".to_string(),
        }
    }
}

impl PromptsConfig {
    pub fn opening_prompt(&self, subject: &str) -> String {
        self.opening.replace("{subject}", subject)
    }

    pub fn rebuttal_prompt(&self, last_argument: &str) -> String {
        self.rebuttal.replace("{last_argument}", last_argument)
    }
}

/// Topic generation and selection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubjectConfig {
    /// System message for the topic-generation call.
    pub system_prompt: String,
    /// User request asking for a numbered list of debate questions.
    pub request: String,
    /// Prompt shown above the topic list.
    pub selection_prompt: String,
    /// Subject used when no topic could be generated.
    pub fallback: String,
    /// Title of the rendered transcript.
    pub title: String,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are an expert on political and social issues in Israel."
                .to_string(),
            request: "Write 3-5 current and meaningful questions, each of which could serve as \
                      the topic of a debate between right and left in Israel. Present each \
                      question as an item in a numbered list."
                .to_string(),
            selection_prompt: "Choose a debate topic:".to_string(),
            fallback: "The debate topic could not be determined because of an error.".to_string(),
            title: "Debate results".to_string(),
        }
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_rounds() -> usize {
    10
}

impl Config {
    /// Load configuration from a file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let config: Config = read_document(path.as_ref())?;
        config.validate()
    }

    /// Load configuration from TOML string content.
    pub fn from_toml_str(content: &str) -> Result<Self, DebateError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| DebateError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()
    }

    fn validate(self) -> Result<Self, DebateError> {
        if self.model.trim().is_empty() {
            return Err(DebateError::Configuration(
                "Model not specified in configuration".to_string(),
            ));
        }
        if self.rounds == 0 {
            return Err(DebateError::Configuration(
                "rounds must be at least 1".to_string(),
            ));
        }
        let (a, b) = (self.personas.a.label.trim(), self.personas.b.label.trim());
        if a.is_empty() || b.is_empty() {
            return Err(DebateError::Configuration(
                "persona labels must not be empty".to_string(),
            ));
        }
        if a == b {
            return Err(DebateError::Configuration(format!(
                "persona labels must differ, both are \"{}\"",
                a
            )));
        }
        Ok(self)
    }
}

/// Read and deserialize a key-value document, choosing the format by extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, DebateError> {
    let content = fs::read_to_string(path).map_err(|e| {
        DebateError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| {
            DebateError::Configuration(format!("Invalid JSON in {}: {}", path.display(), e))
        })
    } else {
        toml::from_str(&content).map_err(|e| {
            DebateError::Configuration(format!("Invalid TOML in {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str(r#"model = "gpt-4o-mini""#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.rounds, 10);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.api_base, None);
        assert_eq!(config.personas, PersonaSet::default());
        assert_eq!(config.prompts, PromptsConfig::default());
    }

    #[test]
    fn test_missing_model_is_configuration_error() {
        let err = Config::from_toml_str("rounds = 3").unwrap_err();
        assert!(matches!(err, DebateError::Configuration(_)));

        let err = Config::from_toml_str(r#"model = "  ""#).unwrap_err();
        assert!(err.to_string().contains("Model not specified"));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = Config::from_toml_str("model = \"m\"\nrounds = 0").unwrap_err();
        assert!(matches!(err, DebateError::Configuration(_)));
    }

    #[test]
    fn test_persona_override() {
        let config = Config::from_toml_str(
            r#"
model = "m"

[personas.a]
label = "Pro"
description = "You argue for the motion."
color = "green"
"#,
        )
        .unwrap();
        assert_eq!(config.personas.a.label, "Pro");
        assert_eq!(config.personas.b.label, "Left");
        assert_eq!(config.personas.rules, PersonaSet::default().rules);
    }

    #[test]
    fn test_persona_labels_validated() {
        let empty = Config::from_toml_str(
            r#"
model = "m"

[personas.b]
label = ""
description = "You argue against."
"#,
        )
        .unwrap_err();
        assert!(empty.to_string().contains("must not be empty"));

        let duplicate = Config::from_toml_str(
            r#"
model = "m"

[personas.a]
label = "Left"
description = "You argue for."
"#,
        )
        .unwrap_err();
        assert!(matches!(duplicate, DebateError::Configuration(_)));
        assert!(duplicate.to_string().contains("must differ"));
    }

    #[test]
    fn test_prompt_templates() {
        let prompts = PromptsConfig::default();
        assert_eq!(
            prompts.opening_prompt("Should X happen?"),
            "State your position on the topic: Should X happen?"
        );
        assert!(prompts.rebuttal_prompt("R1").ends_with(": R1"));
    }

    #[test]
    fn test_load_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"model": "gpt-4o", "rounds": 4}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.rounds, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/debatesim/config.toml").unwrap_err();
        assert!(matches!(err, DebateError::Configuration(_)));
    }
}
