//! PostgreSQL access for LexLedger
//!
//! Connection pooling with a server-side statement timeout, transaction
//! handling, SQLSTATE classification of driver errors and the embedded
//! ledger schema migrations.
//!
//! ```rust,no_run
//! use database_layer::{run_migrations, DatabaseConfig, DatabasePool};
//!
//! # async fn example() -> Result<(), database_layer::DatabaseError> {
//! let config = DatabaseConfig::with_url("postgres://localhost/lexledger");
//! let pool = DatabasePool::connect(&config).await?;
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod transaction;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use migrations::*;
pub use transaction::*;
