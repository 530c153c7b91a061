//! Debate subject generation.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::completion::CompletionBackend;
use crate::config::SubjectConfig;
use crate::error::DebateError;
use crate::message::Message;

/// Ask the backend for candidate debate topics.
///
/// Returns the numbered lines of the reply with their numbering stripped.
pub async fn generate_topics(
    backend: &dyn CompletionBackend,
    config: &SubjectConfig,
    temperature: f32,
) -> Result<Vec<String>, DebateError> {
    let messages = [
        Message::system(config.system_prompt.clone()),
        Message::user(config.request.clone()),
    ];

    let response = backend.complete(None, &messages, temperature).await?;
    Ok(parse_topics(response.text()?))
}

/// Outcome of topic generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicProposal {
    /// At least one topic was parsed from the backend's reply.
    Generated(Vec<String>),
    /// Generation failed or produced nothing; debate this subject instead.
    Fallback(String),
}

/// Generate topics, falling back to `config.fallback` on any failure.
pub async fn propose_topics(
    backend: &dyn CompletionBackend,
    config: &SubjectConfig,
    temperature: f32,
) -> TopicProposal {
    match generate_topics(backend, config, temperature).await {
        Ok(topics) if !topics.is_empty() => TopicProposal::Generated(topics),
        Ok(_) => {
            warn!("topic generation returned no numbered topics");
            TopicProposal::Fallback(config.fallback.clone())
        }
        Err(e) => {
            warn!(error = %e, "topic generation failed");
            TopicProposal::Fallback(config.fallback.clone())
        }
    }
}

/// Extract numbered list items (`"1. ..."`, `"2) ..."`) from free text.
pub fn parse_topics(text: &str) -> Vec<String> {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| {
        Regex::new(r"^\d+\s*[.)]\s+(.+)$").expect("numbered-line pattern is valid")
    });

    text.lines()
        .map(str::trim)
        .filter_map(|line| numbered.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|topic| !topic.is_empty())
        .collect()
}

/// Pick the subject after a selection prompt; a cancelled selection falls
/// back to the first topic.
pub fn resolve_selection(topics: &[String], selection: Option<String>) -> Option<String> {
    selection.or_else(|| topics.first().cloned())
}
