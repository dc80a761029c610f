//! Test doubles for the notifier.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use quill_core::{Notification, Notifier, Result};

/// Notifier that drops everything. Default when no gateway is configured.
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Notifier that records every notification for test assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push(notification.clone());
        Ok(())
    }
}
