//! Drive an upload to a terminal state.

use std::time::Duration;

use asag_core::{PollState, UploadStatus};
use log::{error, info, warn};

use super::client::UploadApi;
use super::error::TransportError;
use crate::notify::{Notifier, outcome_message};

/// Default delay between status checks.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(20_000);
/// Default number of incomplete statuses tolerated.
pub const DEFAULT_MAX_RETRIES: u32 = 20;

/// Pacing of the status loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Fixed wait before each status check.
    pub delay: Duration,
    /// Incomplete statuses tolerated before timing out.
    pub max_retries: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_POLL_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl PollSettings {
    /// Create settings from a delay and retry budget.
    #[must_use]
    pub const fn new(delay: Duration, max_retries: u32) -> Self {
        Self { delay, max_retries }
    }
}

/// Terminal state plus the last status observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// `Finished`, `Error` or `TimedOut`.
    pub state: PollState,
    /// Status that produced `state`.
    pub status: UploadStatus,
}

/// Poll `api` until the upload identified by `initial` ends.
///
/// `initial` is the upload-initiation response and counts as the first
/// observation. The terminal state is announced through `notifier` exactly
/// once; a failing notifier is logged and does not change the outcome.
///
/// # Errors
///
/// Transport failures while fetching a status abort polling without any
/// notification.
pub async fn poll_until_terminal<A, N>(
    api: &A,
    notifier: &N,
    initial: UploadStatus,
    settings: PollSettings,
    host: Option<&str>,
) -> Result<PollOutcome, TransportError>
where
    A: UploadApi + ?Sized,
    N: Notifier + ?Sized,
{
    let upload_id = initial.id.clone();
    let mut state = PollState::initial().advance(&initial, settings.max_retries);
    let mut status = initial;

    while !state.is_terminal() {
        info!(
            "upload {upload_id} not complete after {} of {} attempts; checking again in {:?}",
            state.attempts(),
            settings.max_retries,
            settings.delay
        );
        tokio::time::sleep(settings.delay).await;
        status = api.fetch_status(&upload_id).await?;
        state = state.advance(&status, settings.max_retries);
    }

    match state {
        PollState::Finished { .. } => info!("upload {upload_id} finished"),
        PollState::TimedOut { attempts } => {
            warn!("upload {upload_id} timed out after {attempts} attempts");
        }
        _ => error!(
            "upload {upload_id} failed: {}",
            status.error.as_deref().unwrap_or_default()
        ),
    }

    let outcome = PollOutcome { state, status };
    if let Err(err) = notifier.notify(&outcome_message(&outcome, host)).await {
        warn!("failed to send upload outcome notification: {err}");
    }
    Ok(outcome)
}
