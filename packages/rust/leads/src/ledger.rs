//! CSV-backed, append-only lead ledger.
//!
//! The ledger exposes no update or delete: rows are appended once and read
//! back in append order.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use salesagent_shared::{Lead, LeadForm, Result, SalesAgentError};
use tracing::{debug, info, instrument};

use crate::scoring::score_lead;

/// Ledger columns, in file order.
pub const LEDGER_HEADER: [&str; 7] = [
    "timestamp",
    "name",
    "email",
    "interest",
    "budget",
    "lead_score",
    "status",
];

/// Handle to the ledger file at a fixed path.
#[derive(Debug, Clone)]
pub struct LeadLedger {
    path: PathBuf,
}

impl LeadLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Score a submitted form, stamp it with the current time and append it.
    ///
    /// `interaction_count` is the number of chat turns in the submitting session.
    pub fn capture(&self, form: &LeadForm, interaction_count: usize) -> Result<Lead> {
        let scored = score_lead(&form.interest, &form.budget, &form.email, interaction_count);

        let lead = Lead {
            timestamp: Utc::now(),
            name: form.name.clone(),
            email: form.email.clone(),
            interest: form.interest.clone(),
            budget: form.budget.clone(),
            lead_score: scored.score,
            status: scored.status,
        };

        self.append(&lead)?;
        info!(
            score = lead.lead_score,
            status = %lead.status,
            interactions = interaction_count,
            "lead captured"
        );
        Ok(lead)
    }

    /// Append one lead, writing the header first if the file is new or empty.
    ///
    /// The row is encoded in memory and written with a single call, then
    /// synced, so a failure cannot leave earlier rows damaged.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn append(&self, lead: &Lead) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SalesAgentError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SalesAgentError::io(&self.path, e))?;

        let existing_len = file
            .metadata()
            .map_err(|e| SalesAgentError::io(&self.path, e))?
            .len();

        let bytes = self.encode(lead, existing_len == 0)?;

        file.write_all(&bytes)
            .map_err(|e| SalesAgentError::io(&self.path, e))?;
        file.sync_data()
            .map_err(|e| SalesAgentError::io(&self.path, e))?;

        debug!(bytes = bytes.len(), header = existing_len == 0, "ledger row appended");
        Ok(())
    }

    /// Read every lead in append order. A missing ledger reads as empty.
    pub fn read_all(&self) -> Result<Vec<Lead>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e))?;
        if !headers.iter().eq(LEDGER_HEADER.iter().copied()) {
            return Err(SalesAgentError::ledger(
                &self.path,
                format!("unexpected header row: {}", headers.iter().collect::<Vec<_>>().join(",")),
            ));
        }

        reader
            .deserialize::<Lead>()
            .map(|row| row.map_err(|e| self.csv_error(e)))
            .collect()
    }

    fn encode(&self, lead: &Lead, with_header: bool) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        if with_header {
            writer
                .write_record(LEDGER_HEADER)
                .map_err(|e| self.csv_error(e))?;
        }
        writer.serialize(lead).map_err(|e| self.csv_error(e))?;

        writer
            .into_inner()
            .map_err(|e| SalesAgentError::ledger(&self.path, e.to_string()))
    }

    fn csv_error(&self, e: csv::Error) -> SalesAgentError {
        SalesAgentError::ledger(&self.path, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use salesagent_shared::LeadStatus;
    use uuid::Uuid;

    fn temp_ledger() -> LeadLedger {
        let path = std::env::temp_dir()
            .join(format!("sa_ledger_{}", Uuid::now_v7()))
            .join("leads.csv");
        LeadLedger::new(path)
    }

    fn sample_lead(n: u32) -> Lead {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        Lead {
            timestamp: base + Duration::minutes(i64::from(n)),
            name: format!("Lead {n}"),
            email: format!("lead{n}@example.com"),
            interest: "tripod".into(),
            budget: "80".into(),
            lead_score: 10 + n,
            status: LeadStatus::Cold,
        }
    }

    #[test]
    fn first_append_writes_header() {
        let ledger = temp_ledger();
        ledger.append(&sample_lead(1)).expect("append");

        let raw = std::fs::read_to_string(ledger.path()).expect("read ledger");
        let mut lines = raw.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,name,email,interest,budget,lead_score,status")
        );
        let row = lines.next().expect("data row");
        assert!(row.starts_with("2025-03-01T09:31:00"));
        assert!(row.ends_with(",80,11,cold"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn round_trip_preserves_order_and_values() {
        let ledger = temp_ledger();
        let leads: Vec<Lead> = (0..5).map(sample_lead).collect();
        for lead in &leads {
            ledger.append(lead).expect("append");
        }

        let raw = std::fs::read_to_string(ledger.path()).expect("read ledger");
        assert_eq!(raw.lines().count(), 6);
        assert_eq!(raw.matches("timestamp,name").count(), 1);

        let read_back = ledger.read_all().expect("read_all");
        assert_eq!(read_back, leads);
    }

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let ledger = temp_ledger();
        let mut lead = sample_lead(1);
        lead.name = "Smith, Jane".into();
        lead.interest = r#"the "pro" bundle, urgently"#.into();
        lead.budget = String::new();
        ledger.append(&lead).expect("append");

        let raw = std::fs::read_to_string(ledger.path()).expect("read ledger");
        assert!(raw.contains(r#""Smith, Jane""#));
        assert!(raw.contains(r#""the ""pro"" bundle, urgently""#));

        let read_back = ledger.read_all().expect("read_all");
        assert_eq!(read_back, vec![lead]);
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let ledger = temp_ledger();
        std::fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        std::fs::write(ledger.path(), "").unwrap();

        ledger.append(&sample_lead(2)).expect("append");
        let read_back = ledger.read_all().expect("read_all");
        assert_eq!(read_back.len(), 1);
    }

    #[test]
    fn missing_ledger_reads_empty() {
        let ledger = temp_ledger();
        assert!(ledger.read_all().expect("read_all").is_empty());
    }

    #[test]
    fn foreign_header_is_rejected() {
        let ledger = temp_ledger();
        std::fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        std::fs::write(ledger.path(), "id,title\n1,camera\n").unwrap();

        let err = ledger.read_all().unwrap_err();
        assert!(err.to_string().contains("unexpected header row"));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        // A regular file standing where the parent directory should be.
        let blocker = std::env::temp_dir().join(format!("sa_blocker_{}", Uuid::now_v7()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let ledger = LeadLedger::new(blocker.join("leads.csv"));

        let err = ledger.append(&sample_lead(1)).unwrap_err();
        assert!(matches!(err, SalesAgentError::Io { .. }));
    }

    #[test]
    fn capture_scores_and_appends() {
        let ledger = temp_ledger();
        let form = LeadForm {
            name: "Grace".into(),
            email: "a@b.com".into(),
            interest: "I need this urgently".into(),
            budget: "150".into(),
        };

        let lead = ledger.capture(&form, 2).expect("capture");
        assert_eq!(lead.lead_score, 90);
        assert_eq!(lead.status, LeadStatus::Hot);
        assert_eq!(lead.budget, "150");

        let stored = ledger.read_all().expect("read_all");
        assert_eq!(stored, vec![lead]);
    }

    #[test]
    fn failed_capture_leaves_ledger_untouched() {
        let ledger = temp_ledger();
        ledger.append(&sample_lead(1)).expect("append");

        let blocker = std::env::temp_dir().join(format!("sa_blocker_{}", Uuid::now_v7()));
        std::fs::write(&blocker, "x").unwrap();
        let broken = LeadLedger::new(blocker.join("leads.csv"));
        assert!(broken.capture(&LeadForm::default(), 0).is_err());

        assert_eq!(ledger.read_all().expect("read_all").len(), 1);
    }
}
