//! Error types emitted by the CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use asag_data::TransformError;
use asag_data::mapbox::{TransportError, UploadApiBuildError};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is neither a file nor a directory.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input directory holds no NeTEx document.
    #[error("no NeTEx document found under {path:?}")]
    NoDocument { path: Utf8PathBuf },
    /// Opening the NeTEx document failed.
    #[error("failed to open NeTEx document at {path:?}: {source}")]
    OpenDocument {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The NeTEx document could not be transformed.
    #[error("failed to transform {path:?}: {source}")]
    Transform {
        path: Utf8PathBuf,
        #[source]
        source: TransformError,
    },
    /// Writing the GeoJSON output failed.
    #[error("failed to write GeoJSON to {path:?}: {source}")]
    WriteOutput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Constructing the upload API client failed.
    #[error("failed to build upload API client: {0}")]
    BuildUploadApi(#[source] UploadApiBuildError),
    /// Starting the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Talking to the upload API failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The upload reached a terminal state other than finished.
    #[error("upload {id} ended as {state} after {attempts} attempts")]
    UploadNotFinished {
        id: String,
        state: &'static str,
        attempts: u32,
    },
}
