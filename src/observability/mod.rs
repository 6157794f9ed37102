//! Observability subsystem for mirrordb
//!
//! Structured JSON logging over a typed event catalogue.
//!
//! ```ignore
//! use mirrordb::observability::{Event, Logger};
//!
//! Logger::warn(Event::FallbackEngaged, &[("reason", "connect timeout")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
