//! Plain console output.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use super::{RenderError, Renderer};

/// Prints the transcript as-is and reads selections line by line.
pub struct PlainRenderer<R, W> {
    input: R,
    output: W,
}

impl PlainRenderer<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PlainRenderer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Renderer for PlainRenderer<R, W> {
    fn render(&mut self, transcript_text: &str, title: &str) -> Result<(), RenderError> {
        writeln!(self.output, "{}", title)?;
        writeln!(self.output, "{}", "=".repeat(title.chars().count()))?;
        writeln!(self.output, "{}", transcript_text)?;
        self.output.flush()?;
        Ok(())
    }

    /// Re-prompts on invalid input; only end of input yields `None`.
    fn select(&mut self, options: &[String], prompt: &str) -> Result<Option<String>, RenderError> {
        if options.is_empty() {
            return Ok(None);
        }

        writeln!(self.output, "{}", prompt)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, option)?;
        }

        loop {
            write!(self.output, "Enter a topic number: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim().parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => {
                    return Ok(Some(options[choice - 1].clone()));
                }
                Ok(_) => writeln!(self.output, "Invalid choice. Try again.")?,
                Err(_) => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn options() -> Vec<String> {
        vec!["First topic".to_string(), "Second topic".to_string()]
    }

    #[test]
    fn test_render_prints_title_rule_and_text() {
        let mut renderer = PlainRenderer::new(Cursor::new(""), Vec::new());
        renderer.render("Right: R1\nLeft: R2", "Results").unwrap();

        let output = String::from_utf8(renderer.into_output()).unwrap();
        assert_eq!(output, "Results\n=======\nRight: R1\nLeft: R2\n");
    }

    #[test]
    fn test_rule_counts_characters() {
        let mut renderer = PlainRenderer::new(Cursor::new(""), Vec::new());
        renderer.render("", "תוצאות").unwrap();

        let output = String::from_utf8(renderer.into_output()).unwrap();
        assert_eq!(output.lines().nth(1), Some("======"));
    }

    #[test]
    fn test_select_valid_choice() {
        let mut renderer = PlainRenderer::new(Cursor::new("2\n"), Vec::new());
        let choice = renderer.select(&options(), "Choose:").unwrap();
        assert_eq!(choice.as_deref(), Some("Second topic"));

        let output = String::from_utf8(renderer.into_output()).unwrap();
        assert!(output.starts_with("Choose:\n1. First topic\n2. Second topic\n"));
    }

    #[test]
    fn test_select_loops_on_invalid_input() {
        let mut renderer = PlainRenderer::new(Cursor::new("abc\n0\n7\n1\n"), Vec::new());
        let choice = renderer.select(&options(), "Choose:").unwrap();
        assert_eq!(choice.as_deref(), Some("First topic"));

        let output = String::from_utf8(renderer.into_output()).unwrap();
        assert_eq!(output.matches("Invalid input").count(), 1);
        assert_eq!(output.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn test_select_end_of_input_cancels() {
        let mut renderer = PlainRenderer::new(Cursor::new("x\n"), Vec::new());
        assert_eq!(renderer.select(&options(), "Choose:").unwrap(), None);

        let mut renderer = PlainRenderer::new(Cursor::new("1\n"), Vec::new());
        assert_eq!(renderer.select(&[], "Choose:").unwrap(), None);
    }
}
