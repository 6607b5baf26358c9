//! Blocking HTTP delivery of MessageCards to an incoming webhook.

use super::{excerpt, Deliver, DeliveryError, DeliveryOutcome};
use crate::card::NotificationDocument;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Where cards are posted. An empty URL disables delivery.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,
    /// Sent as a bearer token when present.
    pub credential: Option<String>,
}

impl WebhookTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTarget")
            .field("url", &self.url)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Certificate verification is off unless enabled here, so self-signed
    /// internal webhook proxies work out of the box. Turn it on for any
    /// webhook reached over the public internet.
    pub verify_tls: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_tls: false,
        }
    }
}

pub struct WebhookClient {
    client: reqwest::blocking::Client,
    options: ClientOptions,
}

impl WebhookClient {
    pub fn new(options: ClientOptions) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(DeliveryError::Client)?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn post(&self, target: &WebhookTarget, body: String) -> Result<(), DeliveryError> {
        let transport = |source| DeliveryError::Transport {
            url: target.url.clone(),
            source,
        };

        let mut request = self
            .client
            .post(&target.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(credential) = &target.credential {
            request = request.bearer_auth(credential);
        }

        let response = request.send().map_err(transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Status {
                url: target.url.clone(),
                status: status.as_u16(),
                body_excerpt: excerpt(&body),
            });
        }

        Ok(())
    }
}

impl Deliver for WebhookClient {
    fn deliver(
        &self,
        target: &WebhookTarget,
        document: Option<&NotificationDocument>,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let document = match document {
            Some(doc) if target.is_enabled() => doc,
            _ => return Ok(DeliveryOutcome::Skipped),
        };

        let body = document.to_json_pretty()?;
        debug!("POST {} ({} bytes)", target.url, body.len());
        self.post(target, body)?;
        info!("Delivered \"{}\" to {}", document.summary, target.url);

        Ok(DeliveryOutcome::Delivered)
    }
}
