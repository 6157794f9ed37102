//! Observable events emitted by mirrordb
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Store selection
    /// Remote connection attempt begins
    RemoteConnectStart,
    /// Remote backend answered its liveness probe
    RemoteConnected,
    /// Remote attempt failed; local store engaged for the process lifetime
    FallbackEngaged,
    /// Acquire served from the already-engaged local store
    FallbackShortCircuit,

    // Persistent table
    /// Table file opened
    TableOpened,
    /// Empty table bootstrapped with the seed set
    TableSeeded,
    /// Upsert appended to the table
    UpsertApplied,
    /// Storage read/write failed for one operation
    StorageFault,

    // Query dialect
    /// Filter operator not recognized, treated as pass-through
    FilterOperatorIgnored,
    /// Aggregation stage not recognized, skipped
    PipelineStageIgnored,
    /// Index creation requested on a backend without indexes
    IndexRequestIgnored,
}

impl Event {
    /// Returns the event name as it appears in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RemoteConnectStart => "REMOTE_CONNECT_START",
            Event::RemoteConnected => "REMOTE_CONNECTED",
            Event::FallbackEngaged => "FALLBACK_ENGAGED",
            Event::FallbackShortCircuit => "FALLBACK_SHORT_CIRCUIT",
            Event::TableOpened => "TABLE_OPENED",
            Event::TableSeeded => "TABLE_SEEDED",
            Event::UpsertApplied => "UPSERT_APPLIED",
            Event::StorageFault => "STORAGE_FAULT",
            Event::FilterOperatorIgnored => "FILTER_OPERATOR_IGNORED",
            Event::PipelineStageIgnored => "PIPELINE_STAGE_IGNORED",
            Event::IndexRequestIgnored => "INDEX_REQUEST_IGNORED",
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
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::ConfigLoaded,
            Event::RemoteConnectStart,
            Event::RemoteConnected,
            Event::FallbackEngaged,
            Event::FallbackShortCircuit,
            Event::TableOpened,
            Event::TableSeeded,
            Event::UpsertApplied,
            Event::StorageFault,
            Event::FilterOperatorIgnored,
            Event::PipelineStageIgnored,
            Event::IndexRequestIgnored,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
