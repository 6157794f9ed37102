//! Document store contract and the embedded Local Store backend

mod contract;
mod errors;
mod index;
mod local;

pub use contract::DocumentStore;
pub use errors::{StoreError, StoreResult};
pub use index::{standard_indexes, IndexKind, IndexSpec};
pub use local::{LocalStore, LOCAL_BACKEND};
