//! "Leads" screen — the lead ledger, newest last.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use salesagent_shared::{Lead, LeadStatus};

use super::Action;

pub(crate) struct LeadsScreen {
    leads: Vec<Lead>,
    selected: usize,
    status: String,
}

impl LeadsScreen {
    pub(crate) fn new() -> Self {
        Self {
            leads: Vec::new(),
            selected: 0,
            status: "Press 'r' to reload the ledger.".to_string(),
        }
    }

    pub(crate) fn loaded(&mut self, leads: Vec<Lead>) {
        self.status = format!("{} lead(s).", leads.len());
        self.selected = leads.len().saturating_sub(1);
        self.leads = leads;
    }

    pub(crate) fn failed(&mut self, message: &str) {
        self.status = message.to_string();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Table
                Constraint::Length(3), // Status
            ])
            .split(area);

        if self.leads.is_empty() {
            let empty = Paragraph::new(
                "No leads captured yet.\n\nUse the 'Lead Capture' tab to add one.",
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Leads "));
            f.render_widget(empty, chunks[0]);
        } else {
            let header = Row::new(["Captured", "Name", "Email", "Interest", "Budget", "Score", "Status"])
                .style(Style::default().add_modifier(Modifier::BOLD));

            let rows = self.leads.iter().map(|lead| {
                let color = match lead.status {
                    LeadStatus::Hot => Color::Red,
                    LeadStatus::Warm => Color::Yellow,
                    LeadStatus::Cold => Color::Blue,
                };
                Row::new(vec![
                    lead.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                    lead.name.clone(),
                    lead.email.clone(),
                    lead.interest.clone(),
                    lead.budget.clone(),
                    lead.lead_score.to_string(),
                    lead.status.to_string(),
                ])
                .style(Style::default().fg(color))
            });

            let table = Table::new(
                rows,
                [
                    Constraint::Length(16),
                    Constraint::Percentage(15),
                    Constraint::Percentage(20),
                    Constraint::Min(10),
                    Constraint::Length(8),
                    Constraint::Length(5),
                    Constraint::Length(6),
                ],
            )
            .header(header)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Leads ({}) ", self.leads.len())),
            );

            let mut state = TableState::default().with_selected(Some(self.selected));
            f.render_stateful_widget(table, chunks[0], &mut state);
        }

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(status, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.leads.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('r') => {
                self.status = "Reading ledger...".to_string();
                return Action::RefreshLeads;
            }
            _ => {}
        }
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(name: &str, score: u32, status: LeadStatus) -> Lead {
        Lead {
            timestamp: Utc::now(),
            name: name.into(),
            email: String::new(),
            interest: String::new(),
            budget: String::new(),
            lead_score: score,
            status,
        }
    }

    #[test]
    fn reload_key_requests_refresh() {
        let mut screen = LeadsScreen::new();
        assert_eq!(
            screen.handle_key(KeyCode::Char('r'), KeyModifiers::NONE),
            Action::RefreshLeads
        );
        assert_eq!(screen.status, "Reading ledger...");
    }

    #[test]
    fn loaded_selects_newest_and_navigation_is_bounded() {
        let mut screen = LeadsScreen::new();
        screen.loaded(vec![
            lead("Ada", 90, LeadStatus::Hot),
            lead("Bob", 0, LeadStatus::Cold),
        ]);
        assert_eq!(screen.selected, 1);
        assert_eq!(screen.status, "2 lead(s).");

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.selected, 1);
        screen.handle_key(KeyCode::Up, KeyModifiers::NONE);
        screen.handle_key(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn failed_keeps_previous_rows() {
        let mut screen = LeadsScreen::new();
        screen.loaded(vec![lead("Ada", 90, LeadStatus::Hot)]);
        screen.failed("ledger error: unexpected header");
        assert_eq!(screen.leads.len(), 1);
        assert_eq!(screen.status, "ledger error: unexpected header");
    }

    #[test]
    fn empty_ledger_loads_cleanly() {
        let mut screen = LeadsScreen::new();
        screen.loaded(Vec::new());
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.status, "0 lead(s).");
    }
}
