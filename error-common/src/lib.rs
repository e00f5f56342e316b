//! Common error handling utilities for LexLedger
//!
//! Every crate in the workspace owns its own `thiserror` enum. This crate
//! gives those enums a shared vocabulary so the outer surfaces (the HTTP
//! server and the operations CLI) can treat them uniformly:
//!
//! - **ErrorCategory**: coarse classification used to pick an HTTP status
//!   or a process exit code
//! - **ErrorClassification**: trait implemented by every domain error
//! - **Error Codes**: stable string codes surfaced in API responses
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorCategory, ErrorClassification};
//!
//! #[derive(Debug)]
//! struct MissingAccount;
//!
//! impl ErrorClassification for MissingAccount {
//!     fn category(&self) -> ErrorCategory {
//!         ErrorCategory::NotFound
//!     }
//!
//!     fn code(&self) -> &'static str {
//!         error_common::codes::ledger::NOT_FOUND
//!     }
//! }
//!
//! assert_eq!(MissingAccount.category().http_status(), 404);
//! ```

pub mod codes;
pub mod types;

pub use types::*;
