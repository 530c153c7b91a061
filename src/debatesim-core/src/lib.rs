//! DebateSim Core Library
//!
//! Provides the two-persona debate simulator, the completion backend
//! abstraction, and configuration and credentials loading.

pub mod completion;
pub mod config;
pub mod error;
pub mod keys;
pub mod message;
pub mod persona;
pub mod simulator;
pub mod subject;
pub mod transcript;

pub use completion::{CompletionBackend, CompletionResponse, OpenAiCompletionClient};
pub use config::Config;
pub use error::DebateError;
pub use keys::{KeysLoader, ProcessEnv};
pub use message::{Message, Role};
pub use persona::{LabelColor, Persona, PersonaSet, Speaker};
pub use simulator::{DebateSimulator, SimulationCallback, SimulationEvent};
pub use subject::TopicProposal;
pub use transcript::{TURN_SEPARATOR, Transcript, TranscriptBlock, Turn};
