use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for structured data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text - script bodies exactly as the driver receives them
    #[default]
    Text,
    /// JSON - machine-parseable
    Json,
}

impl OutputFormat {
    /// The command-line flag wins over the configured format.
    #[must_use]
    pub fn resolve(flag: Option<Self>, configured: Self) -> Self {
        flag.unwrap_or(configured)
    }

    /// Serialize data to the requested format
    ///
    /// # Errors
    /// Fails for [`OutputFormat::Text`], whose callers render their own
    /// text, or when JSON serialization fails.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}")),
            Self::Text => bail!("Text format should not use serialize()"),
        }
    }
}
