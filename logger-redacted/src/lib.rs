//! Structured logging with memo redaction for LexLedger
//!
//! - `init_logging` installs the global `tracing` subscriber (human or JSON
//!   output, `RUST_LOG` aware)
//! - `PiiRedactor` masks client e-mail addresses, phone numbers and bank
//!   account numbers before free-text memos reach the logs

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;
