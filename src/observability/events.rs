//! Observable events
//!
//! Every structured log line names one of these.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Process lifecycle
    ConfigLoaded,
    ServerStarting,
    ServerStopped,

    // Catalog lifecycle
    ItemCreated,
    ItemUpdated,
    ItemArchived,
    ItemRestored,
    ItemHardDeleted,
    ItemDuplicated,
    /// A generated code or slug lost a uniqueness race and is being re-allocated
    CodeAllocationRetry,
    /// Status supplied by a client was ignored in favour of the derived one
    AdvisoryStatusIgnored,

    // Side channels
    AuditWriteFailed,
    ImageUploaded,
    SnapshotWriteFailed,

    // HTTP
    RequestRejected,
    RequestFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStarting => "SERVER_STARTING",
            Event::ServerStopped => "SERVER_STOPPED",
            Event::ItemCreated => "ITEM_CREATED",
            Event::ItemUpdated => "ITEM_UPDATED",
            Event::ItemArchived => "ITEM_ARCHIVED",
            Event::ItemRestored => "ITEM_RESTORED",
            Event::ItemHardDeleted => "ITEM_HARD_DELETED",
            Event::ItemDuplicated => "ITEM_DUPLICATED",
            Event::CodeAllocationRetry => "CODE_ALLOCATION_RETRY",
            Event::AdvisoryStatusIgnored => "ADVISORY_STATUS_IGNORED",
            Event::AuditWriteFailed => "AUDIT_WRITE_FAILED",
            Event::ImageUploaded => "IMAGE_UPLOADED",
            Event::SnapshotWriteFailed => "SNAPSHOT_WRITE_FAILED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        for event in [
            Event::ItemCreated,
            Event::ItemHardDeleted,
            Event::CodeAllocationRetry,
            Event::AuditWriteFailed,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
