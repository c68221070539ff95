//! Tileset upload service client and status poller.
//!
//! The upload API is a trait so the poller and publication pipeline can be
//! driven by [`test_support::StubUploadApi`] in tests; [`HttpUploadApi`]
//! talks to the Mapbox uploads endpoints over `reqwest`.
#![forbid(unsafe_code)]

mod client;
mod error;
mod poller;
mod types;

#[doc(hidden)]
pub mod test_support;

pub use client::{
    DEFAULT_API_URL, DEFAULT_USER, DEFAULT_USER_AGENT, HttpUploadApi, HttpUploadApiConfig,
    UploadApi, UploadApiBuildError,
};
pub use error::TransportError;
pub use poller::{
    DEFAULT_MAX_RETRIES, DEFAULT_POLL_DELAY, PollOutcome, PollSettings, poll_until_terminal,
};
pub use types::{UploadCredentials, UploadRequest, tileset_id};
