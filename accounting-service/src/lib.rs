//! Ledger & trust accounting core for a legal practice
//!
//! Provides:
//! - Chart of accounts per company, with atomic reset to a standard chart
//! - Double-entry general ledger with balance validation and cash queries
//! - Client trust subledger with get-or-create accounts, guarded balances
//!   and orphan cleanup
//! - Company wipe and project deletion in explicit dependency order
//! - Exchange rates kept as settings
//!
//! All writes go through a [`store::LedgerStore`] batch, so multi-step
//! changes commit together or not at all.

pub mod error;
pub mod ledger;
pub mod maintenance;
pub mod models;
pub mod policy;
pub mod practice;
pub mod registry;
pub mod reporting;
pub mod service;
pub mod settings;
pub mod store;
pub mod trust;
mod validation;

pub use error::*;
pub use ledger::*;
pub use maintenance::*;
pub use models::*;
pub use policy::*;
pub use practice::*;
pub use registry::*;
pub use reporting::*;
pub use service::*;
pub use settings::*;
pub use trust::*;
