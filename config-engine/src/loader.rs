use config::{Config, Environment, File, Map};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::AppConfig;
use crate::error::{ConfigError, Result};

/// Prefix of environment overrides, e.g. `LEXLEDGER__DATABASE__URL`
pub const ENV_PREFIX: &str = "LEXLEDGER";
/// Names an explicit configuration file when no path is passed
pub const CONFIG_PATH_ENV: &str = "LEXLEDGER_CONFIG";
/// Looked up in the working directory as `lexledger.yaml` / `lexledger.toml`
pub const DEFAULT_CONFIG_NAME: &str = "lexledger";

/// Builds an [`AppConfig`] from, lowest priority first:
/// 1. built-in defaults
/// 2. `lexledger.{yaml,toml,json}` in the working directory, if present
/// 3. an explicit file (argument, else `LEXLEDGER_CONFIG`)
/// 4. `LEXLEDGER__SECTION__KEY` environment variables
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<Map<String, String>>,
    skip_dotenv: bool,
    skip_default_file: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use these variables instead of the process environment
    pub fn with_env(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Do not read `.env` or the working-directory default file
    pub fn isolated(mut self) -> Self {
        self.skip_dotenv = true;
        self.skip_default_file = true;
        self
    }

    pub fn load(self) -> Result<AppConfig> {
        if !self.skip_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
                Err(e) if e.not_found() => {}
                Err(e) => return Err(ConfigError::SourceNotFound(format!(".env: {}", e))),
            }
        }

        let explicit = self.file.or_else(|| {
            if self.env.is_some() {
                None
            } else {
                std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
            }
        });

        let mut builder = Config::builder();
        if !self.skip_default_file {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false));
        }
        if let Some(path) = &explicit {
            if !path.exists() {
                return Err(ConfigError::SourceNotFound(path.display().to_string()));
            }
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins")
                    .source(self.env),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!(
            file = ?explicit,
            database = %config.database.masked_url(),
            currency = %config.ledger.default_currency,
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Load with the default sources
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.with_file(path),
        None => loader,
    }
    .load()
}
