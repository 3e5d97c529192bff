// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Structured JSON output instead of the human-readable format
    pub json: bool,
    /// Redact PII out of logged search terms and filter values
    pub redaction_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redaction_enabled: true,
        }
    }
}

impl LoggerConfig {
    /// The `EnvFilter` directive used when no `RUST_LOG` is present
    pub fn default_directive(&self) -> String {
        format!("{},sqlx=warn", self.level)
    }
}
