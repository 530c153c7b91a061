//! Transcript rendering strategies.
//!
//! Both strategies implement [`Renderer`]; `main` picks one at startup.

mod plain;
mod styled;

pub use plain::PlainRenderer;
pub use styled::StyledRenderer;

use debatesim_core::PersonaSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A surface that can show a finished transcript and ask the user to pick
/// one of several options.
pub trait Renderer {
    /// Present `transcript_text` under `title`.
    fn render(&mut self, transcript_text: &str, title: &str) -> Result<(), RenderError>;

    /// Ask the user to choose one of `options`. `None` means the user
    /// cancelled or no choice could be made.
    fn select(&mut self, options: &[String], prompt: &str) -> Result<Option<String>, RenderError>;
}

/// Build the renderer for this run.
pub fn renderer_for(plain: bool, personas: PersonaSet) -> Box<dyn Renderer> {
    if plain {
        Box::new(PlainRenderer::stdio())
    } else {
        Box::new(StyledRenderer::new(personas))
    }
}
