//! "Social Posts" screen — caption drafts for a product and audience.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;
use crate::widgets::{input_field, submit_button};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Product,
    Audience,
    Generate,
}

pub(crate) struct SocialPostsScreen {
    product: String,
    audience: String,
    focused: Field,
    editing: bool,
    output: String,
    status: String,
}

impl SocialPostsScreen {
    pub(crate) fn new() -> Self {
        Self {
            product: String::new(),
            audience: String::new(),
            focused: Field::Product,
            editing: false,
            output: String::new(),
            status: "Enter a product and choose Generate captions.".to_string(),
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn generated(&mut self, text: String) {
        self.output = text;
        self.status = "Captions ready.".to_string();
    }

    pub(crate) fn failed(&mut self, message: &str) {
        self.status = message.to_string();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Product
                Constraint::Length(3), // Audience
                Constraint::Length(1), // Generate
                Constraint::Length(1), // Status
                Constraint::Min(1),    // Captions
            ])
            .split(area);

        f.render_widget(
            input_field(
                "Product",
                &self.product,
                self.focused == Field::Product,
                self.focused == Field::Product && self.editing,
            ),
            chunks[0],
        );
        f.render_widget(
            input_field(
                "Target audience (e.g., photographers)",
                &self.audience,
                self.focused == Field::Audience,
                self.focused == Field::Audience && self.editing,
            ),
            chunks[1],
        );
        f.render_widget(
            submit_button("Generate captions", self.focused == Field::Generate),
            chunks[2],
        );

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(status, chunks[3]);

        let output = Paragraph::new(self.output.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Captions "));
        f.render_widget(output, chunks[4]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Tab | KeyCode::Enter => {
                    self.editing = false;
                    self.next_field();
                }
                KeyCode::Backspace => {
                    if let Some(field) = self.current_field_mut() {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(field) = self.current_field_mut() {
                        field.push(c);
                    }
                }
                _ => {}
            }
            return Action::None;
        }

        match code {
            KeyCode::Enter if self.focused == Field::Generate => {
                if self.product.trim().is_empty() {
                    self.status = "Enter a product name.".to_string();
                    return Action::None;
                }
                self.status = "Generating...".to_string();
                return Action::GenerateCaptions {
                    product: self.product.clone(),
                    audience: self.audience.clone(),
                };
            }
            KeyCode::Enter => self.editing = true,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            _ => {}
        }
        Action::None
    }

    fn current_field_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            Field::Product => Some(&mut self.product),
            Field::Audience => Some(&mut self.audience),
            Field::Generate => None,
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::Product => Field::Audience,
            Field::Audience => Field::Generate,
            Field::Generate => Field::Product,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::Product => Field::Generate,
            Field::Audience => Field::Product,
            Field::Generate => Field::Audience,
        };
    }
}
