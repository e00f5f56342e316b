// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Mask e-mail addresses, phone numbers and bank account numbers in memos
    pub redaction_enabled: bool,
    /// Default filter directive when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit one JSON object per line instead of human-readable output
    pub json: bool,
    /// Include the module path of each event
    pub with_target: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            log_level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggerConfig {
    /// Filter used when the environment does not provide one
    pub fn default_directive(&self) -> String {
        format!(
            "{level},sqlx=warn,tower_http=info,hyper=info",
            level = self.log_level
        )
    }
}
