//! Audit Trail
//!
//! - Every privileged catalog action produces one record
//! - The log is append-only; records are never mutated or deleted here
//! - Retention and rotation are external concerns
//!
//! Writes are best-effort from the caller's point of view: a failed append
//! is reported through the structured logger and never unwinds the business
//! mutation that triggered it.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

use super::events::Event;
use super::logger::Logger;

/// Audited action verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Archive,
    Restore,
    HardDelete,
    Duplicate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "Create",
            AuditAction::Update => "Update",
            AuditAction::Archive => "Archive",
            AuditAction::Restore => "Restore",
            AuditAction::HardDelete => "HardDelete",
            AuditAction::Duplicate => "Duplicate",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,

    pub timestamp: DateTime<Utc>,

    /// Display name of the caller
    pub actor: String,

    pub role: Role,

    pub action: AuditAction,

    /// `Brochure` or `Service`
    pub target_kind: String,

    pub target_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AuditRecord {
    pub fn new(
        actor: impl Into<String>,
        role: Role,
        action: AuditAction,
        target_kind: impl Into<String>,
        target_id: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: actor.into(),
            role,
            action,
            target_kind: target_kind.into(),
            target_id,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// One JSON object, no trailing newline
    pub fn to_json_line(&self) -> io::Result<String> {
        serde_json::to_string(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Append-only audit sink
pub trait AuditLog: Send + Sync {
    /// Append a record. The record is visible once this returns `Ok`.
    fn append(&self, record: &AuditRecord) -> io::Result<()>;
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "audit log lock poisoned")
}

/// JSON-lines audit file, synced after every record
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditLog {
    /// Open or create an audit log file
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        let line = record.to_json_line()?;
        let mut writer = self.writer.lock().map_err(|_| poisoned())?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

/// In-memory audit log
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        self.records.lock().map_err(|_| poisoned())?.push(record.clone());
        Ok(())
    }
}

/// Best-effort front door to an [`AuditLog`]
#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    /// Build and append a record. Failures are logged, never returned.
    pub fn record(
        &self,
        actor: &str,
        role: Role,
        action: AuditAction,
        target_kind: &str,
        target_id: u64,
        note: Option<String>,
    ) {
        let mut record = AuditRecord::new(actor, role, action, target_kind, target_id);
        record.note = note;
        self.submit(&record);
    }

    /// Append a prepared record. Returns whether the write landed.
    pub fn submit(&self, record: &AuditRecord) -> bool {
        match self.log.append(record) {
            Ok(()) => true,
            Err(e) => {
                Logger::error(
                    Event::AuditWriteFailed,
                    &[
                        ("action", record.action.to_string()),
                        ("actor", record.actor.clone()),
                        ("error", e.to_string()),
                        ("target_id", record.target_id.to_string()),
                        ("target_kind", record.target_kind.clone()),
                    ],
                );
                false
            }
        }
    }
}

impl fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct BrokenLog;

    impl AuditLog for BrokenLog {
        fn append(&self, _record: &AuditRecord) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_record_builder() {
        let record = AuditRecord::new("Mona", Role::PostAdmin, AuditAction::Archive, "Brochure", 4)
            .with_note("previous_status=expired");

        assert_eq!(record.action, AuditAction::Archive);
        assert_eq!(record.target_id, 4);
        assert_eq!(record.note.as_deref(), Some("previous_status=expired"));
    }

    #[test]
    fn test_json_line_round_trips() {
        let record = AuditRecord::new("Owner", Role::SuperAdmin, AuditAction::HardDelete, "Service", 9);
        let line = record.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"HardDelete\""));
        assert!(line.contains("\"super_admin\""));

        let parsed: AuditRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_memory_log_preserves_order() {
        let log = MemoryAuditLog::new();

        log.append(&AuditRecord::new("a", Role::PostAdmin, AuditAction::Create, "Brochure", 1))
            .unwrap();
        log.append(&AuditRecord::new("a", Role::PostAdmin, AuditAction::Update, "Brochure", 1))
            .unwrap();

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, AuditAction::Create);
        assert_eq!(records[1].action, AuditAction::Update);
    }

    #[test]
    fn test_file_log_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("audit.log");

        let log = FileAuditLog::open(&path).unwrap();
        log.append(&AuditRecord::new("a", Role::PostAdmin, AuditAction::Create, "Brochure", 1))
            .unwrap();
        log.append(&AuditRecord::new("a", Role::PostAdmin, AuditAction::Archive, "Brochure", 1))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Archive"));
    }

    #[test]
    fn test_recorder_swallows_write_failure() {
        let recorder = AuditRecorder::new(Arc::new(BrokenLog));
        let record = AuditRecord::new("a", Role::PostAdmin, AuditAction::Create, "Brochure", 1);
        assert!(!recorder.submit(&record));

        // No panic, no error surfaced.
        recorder.record("a", Role::PostAdmin, AuditAction::Update, "Brochure", 1, None);
    }
}
