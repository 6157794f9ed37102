//! Store Selector with sticky fallback
//!
//! The first `acquire` makes one bounded attempt at the remote backend. A
//! failed attempt engages the local store for the rest of the selector's
//! life; later calls never probe the remote again. The whole decision runs
//! under one mutex, so concurrent first callers share a single attempt.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use super::remote::{BackendUnavailable, RemoteConnector};
use crate::document::Document;
use crate::filter::OperatorPolicy;
use crate::observability::{Event, Logger};
use crate::store::{standard_indexes, DocumentStore, LocalStore, StoreResult};

/// Default bound on the remote attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Local-backend and timing settings for a selector
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    pub data_dir: PathBuf,
    pub connect_timeout: Duration,
    /// Written once if the table is opened empty
    pub seed: Vec<Document>,
    pub policy: OperatorPolicy,
}

impl SelectorOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            seed: Vec::new(),
            policy: OperatorPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: Vec<Document>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_policy(mut self, policy: OperatorPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[derive(Default)]
struct SelectorState {
    /// Set once, never cleared
    fallback_engaged: bool,
    remote: Option<Arc<dyn DocumentStore>>,
    local: Option<Arc<LocalStore>>,
    indexes_requested: bool,
}

/// Routes callers to the remote backend or, after one failed attempt, to the
/// local store.
pub struct StoreSelector {
    connector: Arc<dyn RemoteConnector>,
    options: SelectorOptions,
    state: Mutex<SelectorState>,
}

impl StoreSelector {
    pub fn new(connector: Arc<dyn RemoteConnector>, options: SelectorOptions) -> Self {
        Self {
            connector,
            options,
            state: Mutex::new(SelectorState::default()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.options.data_dir
    }

    // The state is a handful of flags and handles that are only ever set,
    // so a poisoned lock still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, SelectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the store handle every caller should use.
    ///
    /// Errors only when the local store itself cannot be opened; that fails
    /// this call without touching the remote backend again.
    pub fn acquire(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        let mut state = self.lock();

        if state.fallback_engaged {
            Logger::trace(Event::FallbackShortCircuit, &[]);
            return self.local(&mut state);
        }

        if let Some(remote) = &state.remote {
            return Ok(Arc::clone(remote));
        }

        let target = self.connector.describe();
        let timeout_ms = self.options.connect_timeout.as_millis().to_string();
        Logger::info(
            Event::RemoteConnectStart,
            &[("target", target.as_str()), ("timeout_ms", timeout_ms.as_str())],
        );

        match self.connect_bounded() {
            Ok(remote) => {
                Logger::info(
                    Event::RemoteConnected,
                    &[
                        ("target", target.as_str()),
                        ("backend", remote.backend_name()),
                    ],
                );
                state.remote = Some(Arc::clone(&remote));
                Ok(remote)
            }
            Err(reason) => {
                state.fallback_engaged = true;
                let reason = reason.to_string();
                Logger::warn(
                    Event::FallbackEngaged,
                    &[("target", target.as_str()), ("reason", reason.as_str())],
                );
                self.local(&mut state)
            }
        }
    }

    /// Like [`acquire`](Self::acquire), also requesting the standard index
    /// set the first time it succeeds.
    pub fn acquire_with_indexes(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        let store = self.acquire()?;

        let mut state = self.lock();
        if !state.indexes_requested {
            for spec in standard_indexes() {
                store.ensure_index(&spec)?;
            }
            state.indexes_requested = true;
        }

        Ok(store)
    }

    /// True once the remote attempt has failed
    pub fn is_fallback_engaged(&self) -> bool {
        self.lock().fallback_engaged
    }

    fn local(&self, state: &mut SelectorState) -> StoreResult<Arc<dyn DocumentStore>> {
        if let Some(local) = &state.local {
            return Ok(Arc::clone(local) as Arc<dyn DocumentStore>);
        }

        let local = Arc::new(LocalStore::open(
            &self.options.data_dir,
            &self.options.seed,
            self.options.policy,
        )?);
        state.local = Some(Arc::clone(&local));
        Ok(local)
    }

    /// Runs the connector on its own thread and stops waiting at the timeout.
    fn connect_bounded(&self) -> Result<Arc<dyn DocumentStore>, BackendUnavailable> {
        let timeout = self.options.connect_timeout;
        let connector = Arc::clone(&self.connector);
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("mirrordb-remote-connect".to_string())
            .spawn(move || {
                // receiver is gone once the attempt timed out
                let _ = tx.send(connector.connect(timeout));
            })
            .map_err(|e| BackendUnavailable::Network(format!("cannot spawn connect thread: {}", e)))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(BackendUnavailable::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(BackendUnavailable::Network(
                "connect attempt ended without a result".to_string(),
            )),
        }
    }
}
