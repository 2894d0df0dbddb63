//! Lead qualification and the append-only lead ledger.
//!
//! [`score_lead`] is the pure scoring heuristic; [`LeadLedger`] persists
//! scored leads to a CSV file that is only ever appended to.

mod ledger;
mod scoring;

pub use ledger::{LEDGER_HEADER, LeadLedger};
pub use scoring::{LeadScore, parse_budget, score_lead, status_for_score};
