//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic. Screens never call services directly:
//! key handling yields an [`Action`] that the app performs.

mod chat;
mod lead_capture;
mod leads;
mod social_posts;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use salesagent_shared::LeadForm;

pub(crate) use chat::ChatScreen;
pub(crate) use lead_capture::LeadCaptureScreen;
pub(crate) use leads::LeadsScreen;
pub(crate) use social_posts::SocialPostsScreen;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Chat,
    LeadCapture,
    SocialPosts,
    Leads,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 4] = [
        ScreenId::Chat,
        ScreenId::LeadCapture,
        ScreenId::SocialPosts,
        ScreenId::Leads,
    ];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "Chat"),
            Self::LeadCapture => write!(f, "Lead Capture"),
            Self::SocialPosts => write!(f, "Social Posts"),
            Self::Leads => write!(f, "Leads"),
        }
    }
}

/// Work requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Ask(String),
    SaveLead(LeadForm),
    GenerateCaptions { product: String, audience: String },
    RefreshLeads,
}

/// State for every tab.
pub(crate) struct Screens {
    pub chat: ChatScreen,
    pub lead_capture: LeadCaptureScreen,
    pub social_posts: SocialPostsScreen,
    pub leads: LeadsScreen,
}

impl Screens {
    pub(crate) fn new() -> Self {
        Self {
            chat: ChatScreen::new(),
            lead_capture: LeadCaptureScreen::new(),
            social_posts: SocialPostsScreen::new(),
            leads: LeadsScreen::new(),
        }
    }

    /// Whether the screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Chat => self.chat.is_editing(),
            ScreenId::LeadCapture => self.lead_capture.is_editing(),
            ScreenId::SocialPosts => self.social_posts.is_editing(),
            ScreenId::Leads => false,
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect) {
        match id {
            ScreenId::Chat => self.chat.draw(f, area),
            ScreenId::LeadCapture => self.lead_capture.draw(f, area),
            ScreenId::SocialPosts => self.social_posts.draw(f, area),
            ScreenId::Leads => self.leads.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Action {
        match id {
            ScreenId::Chat => self.chat.handle_key(code, modifiers),
            ScreenId::LeadCapture => self.lead_capture.handle_key(code, modifiers),
            ScreenId::SocialPosts => self.social_posts.handle_key(code, modifiers),
            ScreenId::Leads => self.leads.handle_key(code, modifiers),
        }
    }
}
