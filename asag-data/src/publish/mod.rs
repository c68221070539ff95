//! End-to-end publication run: export archive to tileset.
//!
//! Responsibilities:
//! - Sequence the run: announce, prepare the working directory, fetch and
//!   unpack the latest export, transform it, stage the artifact, start the
//!   tileset upload and poll it to a terminal state.
//! - Keep storage, archive and staging concerns behind collaborator traits.
//!
//! Boundaries:
//! - Every run starts from an empty working directory; nothing is carried
//!   over between runs.
//! - A missing export blob aborts the run before anything is transformed.
#![forbid(unsafe_code)]

use std::io::{self, BufReader};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use thiserror::Error;

use asag_core::DuplicateIdPolicy;

use crate::mapbox::{
    PollOutcome, PollSettings, TransportError, UploadApi, UploadCredentials, UploadRequest,
    poll_until_terminal, tileset_id,
};
use crate::notify::{Notifier, started_message};
use crate::transform::{TransformError, TransformOptions, TransformReport, transform_document};

#[doc(hidden)]
pub mod test_support;

/// Default working directory.
pub const DEFAULT_WORKDIR: &str = "files/mapbox";
/// Default blob directory holding the exports.
pub const DEFAULT_BLOB_SUBDIR: &str = "tiamat/geocoder";
/// Default name of the latest export archive.
pub const DEFAULT_BLOB_NAME: &str = "tiamat_export_geocoder_latest.zip";
/// Extension of the document searched for after extraction.
pub const DOCUMENT_EXTENSION: &str = "xml";

/// Read access to the blob store holding the exports.
pub trait BlobStore {
    /// Fetch the blob at `path`, or `None` when it does not exist.
    fn get_blob(&self, path: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Unpacks an export archive.
pub trait ArchiveExtractor {
    /// Extract `archive` into `target`.
    fn extract(&self, archive: &[u8], target: &Utf8Path) -> io::Result<()>;
}

/// Stages the artifact where the upload service can read it.
#[async_trait(?Send)]
pub trait ArtifactUploader {
    /// Copy `artifact` to the staging location described by `credentials`.
    async fn upload(&self, credentials: &UploadCredentials, artifact: &Utf8Path)
    -> io::Result<()>;
}

/// Errors that abort a publication run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The working directory could not be prepared or searched.
    #[error("failed to prepare working directory {path}: {source}")]
    Workdir {
        /// Working directory.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: io::Error,
    },
    /// The blob store failed.
    #[error("failed to fetch blob {path}: {source}")]
    Blob {
        /// Blob path.
        path: String,
        /// Store error.
        #[source]
        source: io::Error,
    },
    /// The export blob does not exist.
    #[error("blob {path} not found")]
    BlobNotFound {
        /// Blob path.
        path: String,
    },
    /// The archive could not be extracted.
    #[error("failed to extract export archive: {source}")]
    Extract {
        /// Extractor error.
        #[source]
        source: io::Error,
    },
    /// No document was found after extraction.
    #[error("no .{DOCUMENT_EXTENSION} document found under {path}")]
    NoDocument {
        /// Searched directory.
        path: Utf8PathBuf,
    },
    /// The document could not be opened.
    #[error("failed to open {path}: {source}")]
    OpenDocument {
        /// Document path.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: io::Error,
    },
    /// The transform failed.
    #[error("failed to transform {path}: {source}")]
    Transform {
        /// Document path.
        path: Utf8PathBuf,
        /// Transform error.
        #[source]
        source: TransformError,
    },
    /// The artifact could not be written.
    #[error("failed to write artifact {path}: {source}")]
    WriteArtifact {
        /// Artifact path.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: io::Error,
    },
    /// The artifact could not be staged.
    #[error("failed to stage artifact {path}: {source}")]
    Stage {
        /// Artifact path.
        path: Utf8PathBuf,
        /// Uploader error.
        #[source]
        source: io::Error,
    },
    /// The upload service failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Settings of a publication run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Scratch directory, emptied at the start of every run.
    pub workdir: Utf8PathBuf,
    /// Directory of the export inside the blob store.
    pub blob_subdir: String,
    /// File name of the latest export.
    pub blob_name: String,
    /// Account owning the tileset.
    pub user: String,
    /// Tileset name; the account name is used for the artifact when absent.
    pub project: Option<String>,
    /// Status loop pacing.
    pub poll: PollSettings,
    /// Whether the run starts as soon as the process does.
    pub run_on_startup: bool,
    /// Host name appended to notifications.
    pub host: Option<String>,
    /// Handling of repeated ids in the export.
    pub duplicate_policy: DuplicateIdPolicy,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            workdir: Utf8PathBuf::from(DEFAULT_WORKDIR),
            blob_subdir: DEFAULT_BLOB_SUBDIR.to_owned(),
            blob_name: DEFAULT_BLOB_NAME.to_owned(),
            user: crate::mapbox::DEFAULT_USER.to_owned(),
            project: None,
            poll: PollSettings::default(),
            run_on_startup: true,
            host: None,
            duplicate_policy: DuplicateIdPolicy::default(),
        }
    }
}

impl PublishSettings {
    /// Use `workdir` as scratch directory.
    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Publish for `user`.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Name the tileset and artifact after `project`.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Replace the poll settings.
    #[must_use]
    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Enable or disable the run at process start.
    #[must_use]
    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    /// Append `host` to notifications.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Path of the export inside the blob store.
    #[must_use]
    pub fn blob_path(&self) -> String {
        let subdir = self.blob_subdir.trim_end_matches('/');
        if subdir.is_empty() {
            return self.blob_name.clone();
        }
        format!("{subdir}/{}", self.blob_name)
    }

    /// Target tileset id.
    #[must_use]
    pub fn tileset(&self) -> String {
        tileset_id(&self.user, self.project.as_deref())
    }

    /// File name of the GeoJSON artifact.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        format!("{}.geojson", self.project.as_deref().unwrap_or(&self.user))
    }
}

/// Result of a publication run that reached the upload service.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Transform counters.
    pub transform: TransformReport,
    /// Written artifact.
    pub artifact: Utf8PathBuf,
    /// Terminal upload state.
    pub outcome: PollOutcome,
}

/// Collaborators and settings for publication runs.
#[derive(Debug)]
pub struct Publisher<B, X, U, A, N> {
    blobs: B,
    extractor: X,
    uploader: U,
    api: A,
    notifier: N,
    settings: PublishSettings,
}

impl<B, X, U, A, N> Publisher<B, X, U, A, N>
where
    B: BlobStore,
    X: ArchiveExtractor,
    U: ArtifactUploader,
    A: UploadApi,
    N: Notifier,
{
    /// Assemble a publisher.
    pub const fn new(
        blobs: B,
        extractor: X,
        uploader: U,
        api: A,
        notifier: N,
        settings: PublishSettings,
    ) -> Self {
        Self {
            blobs,
            extractor,
            uploader,
            api,
            notifier,
            settings,
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// The notifier, e.g. to inspect a recording double.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The upload API, e.g. to inspect a scripted double.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Run once at process start when [`PublishSettings::run_on_startup`]
    /// is set; returns `None` without touching any collaborator otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Publisher::run`].
    pub async fn run_on_startup(&self) -> Result<Option<PublishReport>, PublishError> {
        if !self.settings.run_on_startup {
            info!("publication on startup disabled");
            return Ok(None);
        }
        self.run().await.map(Some)
    }

    /// Run one publication from blob to terminal upload state.
    ///
    /// A failed or timed-out upload is a normal outcome reported in
    /// [`PublishReport::outcome`].
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when any step before the terminal state
    /// fails; nothing is uploaded after a failed transform.
    pub async fn run(&self) -> Result<PublishReport, PublishError> {
        let settings = &self.settings;
        let host = settings.host.as_deref();
        if let Err(err) = self.notifier.notify(&started_message(host)).await {
            warn!("failed to send start notification: {err}");
        }

        let workdir = settings.workdir.as_path();
        asag_fs::recreate_dir(workdir).map_err(|source| PublishError::Workdir {
            path: workdir.to_owned(),
            source,
        })?;

        let blob_path = settings.blob_path();
        let archive = self
            .blobs
            .get_blob(&blob_path)
            .map_err(|source| PublishError::Blob {
                path: blob_path.clone(),
                source,
            })?
            .ok_or_else(|| PublishError::BlobNotFound {
                path: blob_path.clone(),
            })?;
        info!("fetched {blob_path} ({} bytes)", archive.len());
        self.extractor
            .extract(&archive, workdir)
            .map_err(|source| PublishError::Extract { source })?;

        let document = asag_fs::find_first_with_extension(workdir, DOCUMENT_EXTENSION)
            .map_err(|source| PublishError::Workdir {
                path: workdir.to_owned(),
                source,
            })?
            .ok_or_else(|| PublishError::NoDocument {
                path: workdir.to_owned(),
            })?;
        info!("transforming {document}");
        let file =
            asag_fs::open_utf8_file(&document).map_err(|source| PublishError::OpenDocument {
                path: document.clone(),
                source,
            })?;
        let options = TransformOptions::default().with_duplicate_policy(settings.duplicate_policy);
        let output = transform_document(BufReader::new(file), &options).map_err(|source| {
            PublishError::Transform {
                path: document.clone(),
                source,
            }
        })?;

        let artifact = workdir.join(settings.artifact_name());
        asag_fs::write_file(&artifact, &output.geojson).map_err(|source| {
            PublishError::WriteArtifact {
                path: artifact.clone(),
                source,
            }
        })?;

        let credentials = self.api.fetch_credentials().await?;
        self.uploader
            .upload(&credentials, &artifact)
            .await
            .map_err(|source| PublishError::Stage {
                path: artifact.clone(),
                source,
            })?;
        let request = UploadRequest {
            tileset: settings.tileset(),
            url: credentials.url.clone(),
            name: settings.artifact_name(),
        };
        info!("starting upload of {} to {}", request.name, request.tileset);
        let initial = self.api.initiate_upload(&request).await?;
        let outcome =
            poll_until_terminal(&self.api, &self.notifier, initial, settings.poll, host).await?;

        Ok(PublishReport {
            transform: output.report,
            artifact,
            outcome,
        })
    }
}
