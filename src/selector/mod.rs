//! Store Selector
//!
//! Decides once per selector whether callers get the remote backend or the
//! embedded local store.

mod remote;
mod sticky;

pub use remote::{redact, BackendUnavailable, RemoteConnector, UnconfiguredRemote};
pub use sticky::{SelectorOptions, StoreSelector, DEFAULT_CONNECT_TIMEOUT};
