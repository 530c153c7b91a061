//! Debate simulation logic.
//!
//! Alternates the two personas turn by turn, replaying the full history to
//! the backend on every call, and stops at the first failed turn.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::completion::{CompletionBackend, DEFAULT_TEMPERATURE};
use crate::config::{Config, PromptsConfig};
use crate::error::DebateError;
use crate::message::Message;
use crate::persona::{PersonaSet, Speaker};
use crate::transcript::{Transcript, Turn};

/// Callback for simulation events.
pub type SimulationCallback = Box<dyn Fn(SimulationEvent) + Send + Sync>;

/// Events emitted during a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationEvent {
    /// A speaker's request is about to be sent.
    TurnStarted {
        round: usize,
        speaker: Speaker,
        label: String,
    },
    /// A speaker's reply was received.
    TurnCompleted {
        round: usize,
        speaker: Speaker,
        label: String,
        content: String,
    },
    /// A speaker's request failed; no further rounds run.
    TurnFailed {
        round: usize,
        speaker: Speaker,
        label: String,
        error: String,
    },
    /// The simulation has finished.
    DebateEnded { turns: usize, ended_early: bool },
}

/// Runs a two-persona debate against a completion backend.
pub struct DebateSimulator {
    backend: Arc<dyn CompletionBackend>,
    personas: PersonaSet,
    prompts: PromptsConfig,
    /// Per-call model override; `None` uses the backend's own model.
    model: Option<String>,
    temperature: f32,
    /// Role-tagged history replayed on every call.
    llm_history: Vec<Message>,
    transcript: Transcript,
    callback: Option<SimulationCallback>,
}

impl DebateSimulator {
    /// Create a simulator with the default personas and prompts.
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            personas: PersonaSet::default(),
            prompts: PromptsConfig::default(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            llm_history: Vec::new(),
            transcript: Transcript::new(),
            callback: None,
        }
    }

    /// Create a simulator using the personas, prompts and temperature from `config`.
    pub fn from_config(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        Self::new(backend)
            .with_personas(config.personas.clone())
            .with_prompts(config.prompts.clone())
            .with_temperature(config.temperature)
    }

    pub fn with_personas(mut self, personas: PersonaSet) -> Self {
        self.personas = personas;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptsConfig) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set a callback for simulation events.
    pub fn with_callback(mut self, callback: SimulationCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run `rounds` turns on `subject`.
    ///
    /// Histories are reset first, so each call is an independent run. The
    /// returned transcript holds one turn per completed round, plus a single
    /// failure turn if a round failed.
    pub async fn simulate(&mut self, subject: &str, rounds: usize) -> Transcript {
        self.llm_history.clear();
        self.transcript = Transcript::new();

        for round in 0..rounds {
            let speaker = Speaker::for_round(round);
            let label = self.personas.label(speaker).to_string();
            let user_prompt = self.user_prompt(round, subject);

            self.emit_event(SimulationEvent::TurnStarted {
                round,
                speaker,
                label: label.clone(),
            });

            let mut messages = Vec::with_capacity(self.llm_history.len() + 2);
            messages.push(Message::system(self.personas.system_prompt(speaker)));
            messages.extend(self.llm_history.iter().cloned());
            messages.push(Message::user(user_prompt.clone()));

            match self.request_turn(&messages).await {
                Ok(content) => {
                    debug!(round, speaker = %label, chars = content.len(), "turn completed");

                    self.llm_history.push(Message::user(user_prompt));
                    self.llm_history.push(Message::assistant(content.clone()));
                    self.transcript
                        .push(Turn::spoken(speaker, label.clone(), content.clone()));

                    self.emit_event(SimulationEvent::TurnCompleted {
                        round,
                        speaker,
                        label,
                        content,
                    });
                }
                Err(e) => {
                    warn!(round, speaker = %label, error = %e, "turn failed, ending debate");

                    self.transcript.push(Turn::failure(speaker, label.clone()));
                    self.emit_event(SimulationEvent::TurnFailed {
                        round,
                        speaker,
                        label,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        self.emit_event(SimulationEvent::DebateEnded {
            turns: self.transcript.len(),
            ended_early: self.transcript.ended_early(),
        });
        self.transcript.clone()
    }

    /// User prompt for a round: the opening prompt first, then a rebuttal of
    /// the last assistant reply.
    fn user_prompt(&self, round: usize, subject: &str) -> String {
        if round == 0 {
            return self.prompts.opening_prompt(subject);
        }
        let last_argument = self
            .llm_history
            .last()
            .map(Message::content)
            .unwrap_or_default();
        self.prompts.rebuttal_prompt(last_argument)
    }

    /// Send one turn's messages and extract the reply text.
    async fn request_turn(&self, messages: &[Message]) -> Result<String, DebateError> {
        let response = self
            .backend
            .complete(self.model.as_deref(), messages, self.temperature)
            .await?;
        Ok(response.text()?.to_string())
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: SimulationEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// LLM-facing history of the latest run.
    pub fn llm_history(&self) -> &[Message] {
        &self.llm_history
    }
}
