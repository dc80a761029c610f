//! # quill-notify
//!
//! Outbound notification delivery for quill: collaborator invitations and
//! password-reset links.
//!
//! Delivery is always fire-and-forget from the caller's perspective. The
//! triggering request records its own outcome first and then hands the
//! notification to [`dispatch`], which spawns the send and logs failures;
//! a delivery failure never fails or rolls back the operation that
//! triggered it.

pub mod http;
pub mod mock;

use std::sync::Arc;

use tracing::warn;

use quill_core::{Notification, Notifier};

pub use http::HttpNotifier;
pub use mock::{NullNotifier, RecordingNotifier};

/// Dispatch a notification without awaiting delivery.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notification).await {
            warn!(
                subsystem = "notify",
                op = "dispatch",
                recipient = notification.recipient(),
                error = %e,
                "Notification delivery failed"
            );
        }
    });
}

/// Build a notifier from the optional gateway URL configuration.
///
/// With no gateway configured, notifications are silently dropped.
pub fn from_config(gateway_url: Option<&str>) -> Arc<dyn Notifier> {
    match gateway_url {
        Some(url) if !url.trim().is_empty() => Arc::new(HttpNotifier::new(url.trim())),
        _ => Arc::new(NullNotifier),
    }
}
