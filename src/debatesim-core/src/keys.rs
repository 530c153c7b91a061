//! Provider credentials loading.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::read_document;
use crate::error::DebateError;

/// Credential names copied from the keys file into the environment.
pub const KNOWN_KEYS: [&str; 3] = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GEMINI_API_KEY"];

/// Destination for credentials.
pub trait EnvSink {
    fn set(&mut self, name: &str, value: &str);
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set(&mut self, name: &str, value: &str) {
        // SAFETY: credentials are applied during bootstrap, before the async
        // runtime or any other thread exists.
        unsafe { std::env::set_var(name, value) }
    }
}

impl EnvSink for HashMap<String, String> {
    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Credentials read from a keys file.
#[derive(Debug, Clone, Default)]
pub struct Keys {
    values: BTreeMap<String, String>,
}

impl Keys {
    /// Load credentials from a TOML or JSON key-value file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let values: BTreeMap<String, String> = read_document(path.as_ref())?;
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Copy every known credential present in the file into `env`.
    ///
    /// Unknown entries are ignored. Returns the names that were applied.
    pub fn apply_to(&self, env: &mut dyn EnvSink) -> Vec<&'static str> {
        let mut applied = Vec::new();
        for name in KNOWN_KEYS {
            if let Some(value) = self.get(name) {
                env.set(name, value);
                applied.push(name);
            }
        }
        applied
    }
}

/// Loads a keys file and applies it to an environment.
pub struct KeysLoader {
    path: PathBuf,
}

impl KeysLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load_into(&self, env: &mut dyn EnvSink) -> Result<Vec<&'static str>, DebateError> {
        let keys = Keys::load(&self.path)?;
        Ok(keys.apply_to(env))
    }
}
