use crate::card::builder::{BuilderOptions, DEFAULT_FAILURE_ICON};
use crate::delivery::{ClientOptions, WebhookTarget};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Notifier configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifierConfig {
    /// Incoming webhook URL. Empty disables delivery.
    pub webhook: String,

    /// Optional bearer token sent with each POST
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,

    /// Send a card when the suite starts
    pub notify_on_suite_start: bool,

    /// Verify the webhook's TLS certificate. Off by default for
    /// self-signed internal proxies.
    pub verify_tls: bool,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Image shown on failed-scenario cards
    pub failure_icon: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            credential: None,
            notify_on_suite_start: true,
            verify_tls: false,
            timeout_secs: 10,
            failure_icon: DEFAULT_FAILURE_ICON.to_string(),
        }
    }
}

impl NotifierConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Invalid notifier config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeoutSecs must be at least 1");
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn target(&self) -> WebhookTarget {
        WebhookTarget {
            url: self.webhook.clone(),
            credential: self.credential.clone(),
        }
    }

    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            notify_on_suite_start: self.notify_on_suite_start,
            failure_icon: self.failure_icon.clone(),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            verify_tls: self.verify_tls,
        }
    }
}
