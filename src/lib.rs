//! mirrordb - An embedded document store with sticky local fallback
//!
//! Reads and writes go through one contract; a selector picks the remote
//! backend when it answers in time and otherwise pins the process to a local
//! file-backed table.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod cursor;
pub mod document;
pub mod filter;
pub mod observability;
pub mod selector;
pub mod storage;
pub mod store;
