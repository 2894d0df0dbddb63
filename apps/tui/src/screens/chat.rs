//! "Chat" screen — product & FAQ questions over the catalog index.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use salesagent_core::AnswerResult;

use super::Action;
use crate::widgets::input_field;

struct Exchange {
    question: String,
    answer: String,
    sources: Vec<String>,
}

pub(crate) struct ChatScreen {
    input: String,
    editing: bool,
    transcript: Vec<Exchange>,
    status: String,
}

impl ChatScreen {
    pub(crate) fn new() -> Self {
        Self {
            input: String::new(),
            editing: false,
            transcript: Vec::new(),
            status: "Press Enter and ask a question (e.g., What is the return policy?)".to_string(),
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Record an answered question.
    pub(crate) fn answered(&mut self, question: &str, result: &AnswerResult) {
        self.transcript.push(Exchange {
            question: question.to_string(),
            answer: result.answer.clone(),
            sources: result.sources.iter().map(|s| s.source.clone()).collect(),
        });
        self.status = format!("Answered from {} source(s).", result.sources.len());
    }

    /// Show a failure; the question stays in the input for another try.
    pub(crate) fn failed(&mut self, question: &str, message: &str) {
        self.input = question.to_string();
        self.status = message.to_string();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status
            ])
            .split(area);

        let mut lines: Vec<Line> = Vec::new();
        for exchange in &self.transcript {
            lines.push(Line::from(vec![
                Span::styled("You: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(exchange.question.as_str()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Agent: ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw(exchange.answer.as_str()),
            ]));
            if !exchange.sources.is_empty() {
                lines.push(
                    Line::from(format!("Sources: {}", exchange.sources.join(", ")))
                        .style(Style::default().fg(Color::DarkGray)),
                );
            }
            lines.push(Line::from(""));
        }

        // Keep the latest exchange in view.
        let visible = chunks[0].height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(visible) as u16;

        let transcript = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Conversation ({}) ", self.transcript.len())),
            );
        f.render_widget(transcript, chunks[0]);

        f.render_widget(
            input_field("Question", &self.input, true, self.editing),
            chunks[1],
        );

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(status, chunks[2]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if !self.editing {
            if code == KeyCode::Enter {
                self.editing = true;
            }
            return Action::None;
        }

        match code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    self.status = "Type a question first.".to_string();
                    return Action::None;
                }
                self.status = "Thinking...".to_string();
                return Action::Ask(std::mem::take(&mut self.input));
            }
            _ => {}
        }
        Action::None
    }
}
