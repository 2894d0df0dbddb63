//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use salesagent_core::captions::generate_captions;
use salesagent_core::{AnsweringService, ChatSession, OpenAiClient};
use salesagent_leads::LeadLedger;
use salesagent_shared::{AppConfig, LeadForm};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::screens::{Action, ScreenId, Screens};
use crate::widgets::status_bar;

type Service = AnsweringService<OpenAiClient, OpenAiClient>;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Per-screen state.
    pub screens: Screens,

    runtime: Runtime,
    /// This terminal's conversation. Lives as long as the app.
    session: ChatSession,
    ledger: LeadLedger,
    service: Service,
    /// Shared with `service`; used for caption drafts.
    client: OpenAiClient,
}

impl App {
    /// Build the app, connecting to the provider and the catalog index.
    ///
    /// A missing API key or an unavailable index is an error here, before
    /// the terminal is taken over, so the process exits with the message.
    pub(crate) fn new(config: AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let client = OpenAiClient::from_app_config(&config)?;
        let index_path = PathBuf::from(&config.defaults.index_path);
        let service = runtime.block_on(Service::connect(&config, &index_path))?;
        let ledger = LeadLedger::new(PathBuf::from(&config.defaults.leads_file));
        let session = ChatSession::new();
        info!(session = %session.id(), "tui session started");

        Ok(Self {
            active_tab: 0,
            should_quit: false,
            status: "Ready — press ? for help".to_string(),
            show_help: false,
            screens: Screens::new(),
            runtime,
            session,
            ledger,
            service,
            client,
        })
    }

    fn current_screen(&self) -> ScreenId {
        ScreenId::ALL[self.active_tab]
    }

    fn select_tab(&mut self, idx: usize) {
        self.active_tab = idx;
        self.status = format!("{}", self.current_screen());
        if self.current_screen() == ScreenId::Leads {
            self.perform(Action::RefreshLeads);
        }
    }

    /// Run a screen's requested action to completion.
    pub(crate) fn perform(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Ask(question) => self.ask(question),
            Action::SaveLead(form) => self.save_lead(&form),
            Action::GenerateCaptions { product, audience } => {
                self.generate_captions(&product, &audience)
            }
            Action::RefreshLeads => match self.ledger.read_all() {
                Ok(leads) => self.screens.leads.loaded(leads),
                Err(e) => self.screens.leads.failed(&e.to_string()),
            },
        }
    }

    fn ask(&mut self, question: String) {
        match self.runtime.block_on(self.session.ask(&self.service, &question)) {
            Ok(result) => {
                self.screens.chat.answered(&question, &result);
                self.status = format!("{} exchange(s) this session", self.session.interaction_count());
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                self.screens.chat.failed(&question, &e.to_string());
            }
        }
    }

    fn save_lead(&mut self, form: &LeadForm) {
        match self.session.capture_lead(&self.ledger, form) {
            Ok(lead) => {
                self.screens.lead_capture.saved(&lead);
                self.status = format!("Lead saved to {}", self.ledger.path().display());
            }
            Err(e) => self.screens.lead_capture.failed(&e.to_string()),
        }
    }

    fn generate_captions(&mut self, product: &str, audience: &str) {
        match self
            .runtime
            .block_on(generate_captions(&self.client, product, audience))
        {
            Ok(text) => self.screens.social_posts.generated(text),
            Err(e) => self.screens.social_posts.failed(&e.to_string()),
        }
    }
}

/// Entry point — sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(config: AppConfig) -> Result<()> {
    let mut app = App::new(config)?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = handle_key(app, key.code, key.modifiers);
                if action != Action::None {
                    // Show the screen's "working" status before blocking.
                    terminal.draw(|f| draw(f, app))?;
                    app.perform(action);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let editing = app.screens.is_editing(app.current_screen());

    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return Action::None;
        }
        KeyCode::Char('q') if !editing => {
            app.should_quit = true;
            return Action::None;
        }
        KeyCode::Char('?') if !editing => {
            app.show_help = !app.show_help;
            return Action::None;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return Action::None;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='4') if !editing => {
            let idx = (c as usize) - ('1' as usize);
            app.select_tab(idx);
            return Action::None;
        }
        KeyCode::Right if !editing => {
            app.select_tab((app.active_tab + 1) % ScreenId::ALL.len());
            return Action::None;
        }
        KeyCode::Left if !editing => {
            let idx = if app.active_tab == 0 {
                ScreenId::ALL.len() - 1
            } else {
                app.active_tab - 1
            };
            app.select_tab(idx);
            return Action::None;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return Action::None;
    }

    // Delegate to current screen
    let screen = app.current_screen();
    app.screens.handle_key(screen, code, modifiers)
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" SalesAgent "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area — delegate to screen
    app.screens.draw(app.current_screen(), f, chunks[1]);

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-4          Switch to screen"),
        Line::from("  ←/→          Previous/next screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Screen-specific:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Edit field / Send / Submit"),
        Line::from("  Esc          Stop editing"),
        Line::from("  Tab ↑/↓      Move between fields"),
        Line::from("  r            Reload leads (Leads tab)"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key_env(var: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.provider.api_key_env = var.into();
        config.defaults.index_path = std::env::temp_dir()
            .join("sa_tui_missing_index")
            .join("catalog.db")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[test]
    fn missing_api_key_stops_startup() {
        let config = config_with_key_env("SA_TUI_TEST_NONEXISTENT_KEY_9876");
        let err = App::new(config).err().expect("startup must fail without a key");
        assert!(err.to_string().contains("SA_TUI_TEST_NONEXISTENT_KEY_9876"));
    }

    #[test]
    fn missing_index_stops_startup() {
        // PATH is set in any test environment
        let config = config_with_key_env("PATH");
        let err = App::new(config).err().expect("startup must fail without an index");
        let message = err.to_string();
        assert!(message.contains("does not exist"));
        assert!(message.contains("salesagent ingest"));
    }
}
