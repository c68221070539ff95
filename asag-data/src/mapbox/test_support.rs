//! In-memory doubles for the uploads API and notifier.
//!
//! [`StubUploadApi`] replays a scripted sequence of statuses and records
//! every call, so tests can drive the poller without a network.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::io;

use asag_core::UploadStatus;
use async_trait::async_trait;

use super::client::UploadApi;
use super::error::TransportError;
use super::types::{UploadCredentials, UploadRequest};
use crate::notify::{Notifier, NotifyError};

/// Scripted [`UploadApi`].
///
/// # Example
///
/// ```
/// use asag_core::UploadStatus;
/// use asag_data::mapbox::UploadApi;
/// use asag_data::mapbox::test_support::{StubUploadApi, block_on_for_tests};
///
/// let api = StubUploadApi::new(UploadStatus::default())
///     .with_statuses([UploadStatus { complete: true, ..UploadStatus::default() }]);
/// let status = block_on_for_tests(api.fetch_status("upload-1")).expect("scripted status");
/// assert!(status.complete);
/// assert_eq!(api.status_calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubUploadApi {
    credentials: UploadCredentials,
    initiated: UploadStatus,
    statuses: RefCell<VecDeque<Result<UploadStatus, u16>>>,
    requests: RefCell<Vec<UploadRequest>>,
    status_calls: RefCell<usize>,
}

impl StubUploadApi {
    /// Stub answering upload initiation with `initiated`.
    #[must_use]
    pub fn new(initiated: UploadStatus) -> Self {
        Self {
            credentials: sample_credentials(),
            initiated,
            statuses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
            status_calls: RefCell::new(0),
        }
    }

    /// Queue statuses returned by successive status checks.
    #[must_use]
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = UploadStatus>) -> Self {
        self.statuses
            .borrow_mut()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    /// Queue an HTTP failure for the next unanswered status check.
    #[must_use]
    pub fn with_status_failure(self, status: u16) -> Self {
        self.statuses.borrow_mut().push_back(Err(status));
        self
    }

    /// Number of status checks made so far.
    #[must_use]
    pub fn status_calls(&self) -> usize {
        *self.status_calls.borrow()
    }

    /// Upload requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.borrow().clone()
    }
}

/// Credentials with recognisable placeholder values.
#[must_use]
pub fn sample_credentials() -> UploadCredentials {
    UploadCredentials {
        bucket: "tilestream-tilesets-production".to_owned(),
        key: "_pending/entur/staged".to_owned(),
        access_key_id: "ASIATEST".to_owned(),
        secret_access_key: "secret".to_owned(),
        session_token: "session".to_owned(),
        url: "https://tilestream-tilesets-production.s3.amazonaws.com/_pending/entur/staged"
            .to_owned(),
    }
}

#[async_trait(?Send)]
impl UploadApi for StubUploadApi {
    async fn fetch_credentials(&self) -> Result<UploadCredentials, TransportError> {
        Ok(self.credentials.clone())
    }

    async fn initiate_upload(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadStatus, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self.initiated.clone())
    }

    async fn fetch_status(&self, upload_id: &str) -> Result<UploadStatus, TransportError> {
        *self.status_calls.borrow_mut() += 1;
        let url = format!("stub://uploads/{upload_id}");
        match self.statuses.borrow_mut().pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(status)) => Err(TransportError::Http {
                url,
                status,
                message: "scripted failure".to_owned(),
            }),
            None => Err(TransportError::Network {
                url,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted status left"),
            }),
        }
    }
}

/// [`Notifier`] keeping every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Notifier that records and succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that records and then reports a delivery failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.borrow_mut().push(message.to_owned());
        if self.fail {
            return Err(NotifyError::Rejected { status: 500 });
        }
        Ok(())
    }
}

/// Run `future` to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics when the runtime cannot be built.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}
