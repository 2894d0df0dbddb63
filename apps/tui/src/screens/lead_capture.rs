//! "Lead Capture" screen — prospect form, scored and saved to the ledger.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use salesagent_shared::{Lead, LeadForm, LeadStatus};

use super::Action;
use crate::widgets::{input_field, submit_button};

/// Which input field is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Interest,
    Budget,
    Submit,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Name => Field::Email,
            Field::Email => Field::Interest,
            Field::Interest => Field::Budget,
            Field::Budget => Field::Submit,
            Field::Submit => Field::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Name => Field::Submit,
            Field::Email => Field::Name,
            Field::Interest => Field::Email,
            Field::Budget => Field::Interest,
            Field::Submit => Field::Budget,
        }
    }
}

pub(crate) struct LeadCaptureScreen {
    form: LeadForm,
    focused: Field,
    editing: bool,
    status: String,
    last_status: Option<LeadStatus>,
}

impl LeadCaptureScreen {
    pub(crate) fn new() -> Self {
        Self {
            form: LeadForm::default(),
            focused: Field::Name,
            editing: false,
            status: "Fill in the prospect's details and choose Save lead.".to_string(),
            last_status: None,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// The lead was written; clear the form for the next prospect.
    pub(crate) fn saved(&mut self, lead: &Lead) {
        self.form = LeadForm::default();
        self.focused = Field::Name;
        self.last_status = Some(lead.status);
        self.status = format!(
            "Saved lead (score={}, status={})",
            lead.lead_score, lead.status
        );
    }

    /// Saving failed; the form keeps its contents.
    pub(crate) fn failed(&mut self, message: &str) {
        self.last_status = None;
        self.status = format!("Could not save lead: {message}");
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(3), // Email
                Constraint::Length(3), // Interest
                Constraint::Length(3), // Budget
                Constraint::Length(1), // Submit
                Constraint::Length(1), // Hint
                Constraint::Min(1),    // Status
            ])
            .split(area);

        let fields = [
            (Field::Name, "Name", &self.form.name),
            (Field::Email, "Email", &self.form.email),
            (Field::Interest, "Interest / Product", &self.form.interest),
            (Field::Budget, "Budget (optional)", &self.form.budget),
        ];
        for (i, (field, title, value)) in fields.into_iter().enumerate() {
            let focused = self.focused == field;
            f.render_widget(
                input_field(title, value, focused, focused && self.editing),
                chunks[i],
            );
        }

        f.render_widget(
            submit_button("Save lead", self.focused == Field::Submit),
            chunks[4],
        );

        let hint = if self.editing {
            "Type to edit · Esc to stop editing · Tab to next field"
        } else {
            "Enter to edit · Tab/↑/↓ to move · Enter on Save lead to submit"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[5]);

        let status_color = match self.last_status {
            Some(LeadStatus::Hot) => Color::Red,
            Some(LeadStatus::Warm) => Color::Yellow,
            Some(LeadStatus::Cold) => Color::Blue,
            None => Color::White,
        };
        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(status_color))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        f.render_widget(status, chunks[6]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Tab | KeyCode::Enter => {
                    self.editing = false;
                    self.focused = self.focused.next();
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
            KeyCode::Enter if self.focused == Field::Submit => {
                self.status = "Saving lead...".to_string();
                return Action::SaveLead(self.form.clone());
            }
            KeyCode::Enter => self.editing = true,
            KeyCode::Tab | KeyCode::Down => self.focused = self.focused.next(),
            KeyCode::BackTab | KeyCode::Up => self.focused = self.focused.prev(),
            _ => {}
        }
        Action::None
    }

    fn current_field_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            Field::Name => Some(&mut self.form.name),
            Field::Email => Some(&mut self.form.email),
            Field::Interest => Some(&mut self.form.interest),
            Field::Budget => Some(&mut self.form.budget),
            Field::Submit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn key(screen: &mut LeadCaptureScreen, code: KeyCode) -> Action {
        screen.handle_key(code, KeyModifiers::NONE)
    }

    fn fill(screen: &mut LeadCaptureScreen, text: &str) {
        key(screen, KeyCode::Enter);
        for c in text.chars() {
            key(screen, KeyCode::Char(c));
        }
        // Enter while editing moves to the next field.
        key(screen, KeyCode::Enter);
    }

    #[test]
    fn filled_form_is_submitted() {
        let mut screen = LeadCaptureScreen::new();
        fill(&mut screen, "Ada");
        fill(&mut screen, "ada@example.com");
        fill(&mut screen, "need a tripod");
        fill(&mut screen, "150");

        let action = key(&mut screen, KeyCode::Enter);
        assert_eq!(
            action,
            Action::SaveLead(LeadForm {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                interest: "need a tripod".into(),
                budget: "150".into(),
            })
        );
    }

    #[test]
    fn empty_form_can_be_submitted() {
        let mut screen = LeadCaptureScreen::new();
        key(&mut screen, KeyCode::BackTab);
        assert_eq!(
            key(&mut screen, KeyCode::Enter),
            Action::SaveLead(LeadForm::default())
        );
    }

    #[test]
    fn saved_clears_form_failed_keeps_it() {
        let mut screen = LeadCaptureScreen::new();
        fill(&mut screen, "Ada");

        screen.failed("permission denied");
        assert_eq!(screen.form.name, "Ada");
        assert!(screen.status.contains("permission denied"));

        screen.saved(&Lead {
            timestamp: Utc::now(),
            name: "Ada".into(),
            email: String::new(),
            interest: String::new(),
            budget: String::new(),
            lead_score: 0,
            status: LeadStatus::Cold,
        });
        assert_eq!(screen.form, LeadForm::default());
        assert_eq!(screen.status, "Saved lead (score=0, status=cold)");
    }
}
