//! Configuration loading for LexLedger processes
//!
//! Settings are layered with the `config` crate:
//! - built-in defaults of every section
//! - an optional `lexledger.yaml` / `lexledger.toml` in the working directory
//! - an explicit file (`--config` or `LEXLEDGER_CONFIG`)
//! - `LEXLEDGER__SECTION__KEY` environment variables, `.env` included
//!
//! # Example
//!
//! ```no_run
//! use config_engine::load_config;
//!
//! let config = load_config(None)?;
//! println!("listening on {}", config.server.bind_address());
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod app;
pub mod error;
pub mod loader;

pub use app::*;
pub use error::*;
pub use loader::*;
