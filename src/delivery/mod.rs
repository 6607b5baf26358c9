pub mod webhook;

use crate::card::NotificationDocument;
use thiserror::Error;

pub use webhook::{ClientOptions, WebhookClient, WebhookTarget};

/// Maximum number of response body characters kept in a [`DeliveryError`].
pub const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook {url} answered {status}: {body_excerpt}")]
    Status {
        url: String,
        status: u16,
        body_excerpt: String,
    },

    #[error("webhook {url} unreachable: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to encode card: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Nothing to send, or no webhook configured.
    Skipped,
}

/// Sends finished documents somewhere.
pub trait Deliver {
    fn deliver(
        &self,
        target: &WebhookTarget,
        document: Option<&NotificationDocument>,
    ) -> Result<DeliveryOutcome, DeliveryError>;
}

pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}
