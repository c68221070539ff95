//! Chat-ops notifications about publication runs.
//!
//! Messages use Slack-style emoji shortcodes. [`WebhookNotifier`] posts
//! `{"text": ...}` to an incoming webhook; [`LogNotifier`] only logs, for
//! runs without a webhook.

use std::io;

use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::mapbox::PollOutcome;

/// Failure to deliver a notification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// The webhook answered with an error status.
    #[error("webhook rejected notification with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
    /// The webhook could not be reached.
    #[error("failed to reach webhook: {source}")]
    Network {
        /// Transport error.
        source: io::Error,
    },
}

/// Destination for one-shot run messages.
#[async_trait(?Send)]
pub trait Notifier {
    /// Deliver `message`.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts messages to an incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Notifier posting to `url` with a default client.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Notifier reusing an existing client.
    #[must_use]
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait(?Send)]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .map_err(|err| NotifyError::Network {
                source: io::Error::other(err.without_url()),
            })?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Writes messages to the log instead of a chat channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait(?Send)]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        info!("notification: {message}");
        Ok(())
    }
}

fn host_suffix(host: Option<&str>) -> String {
    host.filter(|host| !host.is_empty())
        .map(|host| format!(" on {host}"))
        .unwrap_or_default()
}

/// Message announcing the start of a publication run.
///
/// # Examples
///
/// ```
/// use asag_data::notify::started_message;
///
/// assert_eq!(started_message(None), "Started mapbox update :world_map:");
/// assert_eq!(
///     started_message(Some("worker-1")),
///     "Started mapbox update on worker-1 :world_map:"
/// );
/// ```
#[must_use]
pub fn started_message(host: Option<&str>) -> String {
    format!("Started mapbox update{} :world_map:", host_suffix(host))
}

/// Message describing a terminal poll outcome.
#[must_use]
pub fn outcome_message(outcome: &PollOutcome, host: Option<&str>) -> String {
    let status = &outcome.status;
    let tileset = status.tileset.as_deref().unwrap_or_default();
    let suffix = host_suffix(host);
    if outcome.state.is_success() {
        return format!(
            "Tilset `{tileset}` uploaded to mapbox successfully :golfer:.{suffix} :world_map:"
        );
    }
    format!(
        "*{}*: Upload `{}`, name: `{}`, tileset: `{tileset}`, message: `{}`, error: {} :fire:{suffix} :world_map:",
        outcome.state.label(),
        status.id,
        status.name.as_deref().unwrap_or_default(),
        status.message.as_deref().unwrap_or_default(),
        status.error.as_deref().unwrap_or("null"),
    )
}
