//! Observability for Giyo
//!
//! - Structured JSON logging ([`Logger`], [`Event`])
//! - The audit trail of privileged catalog actions ([`AuditRecorder`])
//!
//! Neither channel can fail a request: log writes are dropped on error and
//! audit failures are reported through the logger.
//!
//! # Usage
//!
//! ```ignore
//! use giyo::observability::{Event, Logger};
//!
//! Logger::info(Event::ItemCreated, &[("id", "7".to_string())]);
//! ```

mod events;
mod logger;
pub mod audit;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use audit::{AuditAction, AuditLog, AuditRecord, AuditRecorder, FileAuditLog, MemoryAuditLog};
