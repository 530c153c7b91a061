//! Full-screen terminal window with speaker-colored transcript blocks.

use std::io;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use debatesim_core::transcript::split_blocks;
use debatesim_core::{LabelColor, PersonaSet};

use super::{RenderError, Renderer};

const PAGE: u16 = 10;

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, RenderError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
    }
}

/// What a key press means in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up(u16),
    Down(u16),
    Top,
    Bottom,
    Accept,
    Digit(usize),
    Close,
    None,
}

fn action_for(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Close,
        KeyCode::Esc | KeyCode::Char('q') => Action::Close,
        KeyCode::Up | KeyCode::Char('k') => Action::Up(1),
        KeyCode::Down | KeyCode::Char('j') => Action::Down(1),
        KeyCode::PageUp => Action::Up(PAGE),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::Down(PAGE),
        KeyCode::Home | KeyCode::Char('g') => Action::Top,
        KeyCode::End | KeyCode::Char('G') => Action::Bottom,
        KeyCode::Enter => Action::Accept,
        KeyCode::Char(c) => c
            .to_digit(10)
            .map(|d| Action::Digit(d as usize))
            .unwrap_or(Action::None),
        _ => Action::None,
    }
}

fn label_color(color: LabelColor) -> Color {
    match color {
        LabelColor::Default => Color::Reset,
        LabelColor::Red => Color::Red,
        LabelColor::Green => Color::Green,
        LabelColor::Yellow => Color::Yellow,
        LabelColor::Blue => Color::Blue,
        LabelColor::Magenta => Color::Magenta,
        LabelColor::Cyan => Color::Cyan,
    }
}

/// Lay out transcript text as styled lines.
///
/// A recognized `"<label>:"` prefix gets the speaker's color in bold; a gray
/// rule of `rule_width` goes between blocks but not after the last one.
fn transcript_lines(text: &str, personas: &PersonaSet, rule_width: usize) -> Vec<Line<'static>> {
    let blocks = split_blocks(text, personas);
    let mut lines = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        let mut body = block.body.lines();

        match block.speaker {
            Some(speaker) => {
                let style = Style::default()
                    .fg(label_color(personas.get(speaker).color))
                    .add_modifier(Modifier::BOLD);
                let mut first = vec![Span::styled(block.prefix.clone(), style)];
                if let Some(rest) = body.next() {
                    first.push(Span::raw(rest.to_string()));
                }
                lines.push(Line::from(first));
            }
            None => {
                if let Some(first) = body.next() {
                    lines.push(Line::raw(first.to_string()));
                }
            }
        }
        lines.extend(body.map(|l| Line::raw(l.to_string())));

        if i + 1 < blocks.len() {
            lines.push(Line::styled(
                "─".repeat(rule_width),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    lines
}

fn move_selection(state: &mut ListState, delta: isize, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let cur = state.selected().unwrap_or(0) as isize;
    let next = (cur + delta).clamp(0, len as isize - 1);
    state.select(Some(next as usize));
}

/// Renders into the terminal's alternate screen and blocks until closed.
pub struct StyledRenderer {
    personas: PersonaSet,
}

impl StyledRenderer {
    pub fn new(personas: PersonaSet) -> Self {
        Self { personas }
    }

    /// Draw the transcript window, clamping `scroll` to the wrapped height so
    /// the last line can always be brought into view.
    fn draw_transcript(&self, f: &mut Frame<'_>, text: &str, title: &str, scroll: &mut u16) {
        let area = f.area();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let inner_width = layout[0].width.saturating_sub(2);
        let inner_height = layout[0].height.saturating_sub(2) as usize;
        let lines = transcript_lines(text, &self.personas, inner_width as usize);

        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        let max_scroll = paragraph
            .line_count(inner_width)
            .saturating_sub(inner_height)
            .min(u16::MAX as usize) as u16;
        *scroll = (*scroll).min(max_scroll);

        let widget = paragraph
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(format!(" {} ", title)),
            )
            .scroll((*scroll, 0));
        f.render_widget(widget, layout[0]);

        let help = Paragraph::new(Line::styled(
            " ↑/↓ scroll · PgUp/PgDn page · q close",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(help, layout[1]);
    }

    fn draw_selection(f: &mut Frame<'_>, options: &[String], prompt: &str, state: &mut ListState) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        let header = Paragraph::new(prompt.to_string())
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(header, layout[0]);

        let items: Vec<ListItem> = options
            .iter()
            .enumerate()
            .map(|(i, option)| ListItem::new(format!("{}. {}", i + 1, option)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" Topics "),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, layout[1], state);

        let help = Paragraph::new(Line::styled(
            " ↑/↓ move · 1-9 jump · Enter choose · Esc cancel",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(help, layout[2]);
    }
}

impl Renderer for StyledRenderer {
    fn render(&mut self, transcript_text: &str, title: &str) -> Result<(), RenderError> {
        let guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        let mut scroll: u16 = 0;

        loop {
            terminal.draw(|f| self.draw_transcript(f, transcript_text, title, &mut scroll))?;

            if let Event::Key(key) = event::read()? {
                match action_for(key) {
                    Action::Close => break,
                    Action::Up(n) => scroll = scroll.saturating_sub(n),
                    Action::Down(n) => scroll = scroll.saturating_add(n),
                    Action::Top => scroll = 0,
                    Action::Bottom => scroll = u16::MAX,
                    _ => {}
                }
            }
        }

        terminal.show_cursor()?;
        drop(guard);
        Ok(())
    }

    /// Single attempt: Enter picks the highlighted topic, Esc cancels.
    fn select(&mut self, options: &[String], prompt: &str) -> Result<Option<String>, RenderError> {
        if options.is_empty() {
            return Ok(None);
        }

        let guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let mut state = ListState::default();
        state.select(Some(0));

        let choice = loop {
            terminal.draw(|f| Self::draw_selection(f, options, prompt, &mut state))?;

            if let Event::Key(key) = event::read()? {
                match action_for(key) {
                    Action::Close => break None,
                    Action::Accept => break state.selected().map(|i| options[i].clone()),
                    Action::Up(n) => move_selection(&mut state, -(n as isize), options.len()),
                    Action::Down(n) => move_selection(&mut state, n as isize, options.len()),
                    Action::Top => state.select(Some(0)),
                    Action::Bottom => state.select(Some(options.len() - 1)),
                    Action::Digit(d) if (1..=options.len()).contains(&d) => {
                        state.select(Some(d - 1))
                    }
                    _ => {}
                }
            }
        };

        terminal.show_cursor()?;
        drop(guard);
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debatesim_core::{Speaker, TURN_SEPARATOR};
    use ratatui::backend::TestBackend;

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn text() -> String {
        format!(
            "Right: lower taxes\n{sep}\nLeft: more welfare\nand housing\n{sep}\nunlabelled words",
            sep = TURN_SEPARATOR
        )
    }

    #[test]
    fn test_prefix_is_colored_and_bold() {
        let personas = PersonaSet::default();
        let lines = transcript_lines(&text(), &personas, 5);

        let first = &lines[0];
        assert_eq!(first.spans[0].content, "Right:");
        assert_eq!(first.spans[0].style.fg, Some(Color::Blue));
        assert!(first.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(first.spans[1].content, " lower taxes");
        assert_eq!(first.spans[1].style, Style::default());

        let left = &lines[2];
        assert_eq!(left.spans[0].content, "Left:");
        assert_eq!(
            left.spans[0].style.fg,
            Some(label_color(personas.get(Speaker::B).color))
        );
    }

    #[test]
    fn test_rules_between_blocks_only() {
        let lines = transcript_lines(&text(), &PersonaSet::default(), 5);
        let rules: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.spans.len() == 1 && line.spans[0].content == "─────")
            .map(|(i, _)| i)
            .collect();

        // blocks: 1 line, 2 lines, 1 line
        assert_eq!(rules, vec![1, 4]);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5].spans[0].content, "unlabelled words");
        assert_eq!(lines[5].spans[0].style, Style::default());
    }

    #[test]
    fn test_trailing_separator_adds_no_rule() {
        let text = format!("Right: only\n{}\n", TURN_SEPARATOR);
        let lines = transcript_lines(&text, &PersonaSet::default(), 3);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_key_actions() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(action_for(press(KeyCode::Esc)), Action::Close);
        assert_eq!(action_for(press(KeyCode::Down)), Action::Down(1));
        assert_eq!(action_for(press(KeyCode::PageUp)), Action::Up(PAGE));
        assert_eq!(action_for(press(KeyCode::Char('3'))), Action::Digit(3));
        assert_eq!(action_for(press(KeyCode::Enter)), Action::Accept);
        assert_eq!(
            action_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Close
        );
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut state = ListState::default();
        move_selection(&mut state, -1, 3);
        assert_eq!(state.selected(), Some(0));
        move_selection(&mut state, 10, 3);
        assert_eq!(state.selected(), Some(2));
        move_selection(&mut state, 1, 0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_scroll_reaches_end_of_wrapped_transcript() {
        let renderer = StyledRenderer::new(PersonaSet::default());
        let text = format!("Right: {}END_MARKER", "word ".repeat(400));
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let shows_end = |rows: Vec<String>| rows.iter().any(|row| row.contains("END_MARKER"));

        let mut scroll = 0;
        terminal
            .draw(|f| renderer.draw_transcript(f, &text, "Results", &mut scroll))
            .unwrap();
        assert_eq!(scroll, 0);
        assert!(!shows_end(screen_rows(&terminal)));

        let mut scroll = u16::MAX;
        terminal
            .draw(|f| renderer.draw_transcript(f, &text, "Results", &mut scroll))
            .unwrap();
        // 2000 characters wrap to far more than the raw line count.
        assert!(scroll > 20, "scroll clamped to {scroll}");
        assert!(shows_end(screen_rows(&terminal)));
    }
}
