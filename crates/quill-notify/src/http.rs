//! HTTP gateway notifier.
//!
//! Delivers notifications as JSON envelopes POSTed to a configured mail
//! gateway. Delivery is best-effort; callers go through [`crate::dispatch`]
//! and never block on the outcome.

use async_trait::async_trait;
use std::time::Duration;

use quill_core::defaults::NOTIFY_TIMEOUT_SECS;
use quill_core::{Error, Notification, Notifier, Result};

/// Notifier that POSTs each notification to an HTTP mail gateway.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    gateway_url: String,
}

impl HttpNotifier {
    /// Create a notifier targeting the given gateway URL.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            gateway_url: gateway_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.gateway_url)
            .json(notification)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Notify(format!(
                "mail gateway returned {} for {}",
                response.status(),
                notification.recipient()
            )));
        }
        Ok(())
    }
}
