//! Transport errors raised by the upload API.

use std::io;

use thiserror::Error;

/// Failures talking to the upload service. All are fatal for the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Request URL without credentials.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// The response body did not match the expected schema.
    #[error("unexpected response from {url}: {message}")]
    Decode {
        /// Request URL without credentials.
        url: String,
        /// Decoder message.
        message: String,
    },
}
