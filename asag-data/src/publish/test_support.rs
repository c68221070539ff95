//! In-memory collaborators for publication runs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Read};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};

use super::{ArchiveExtractor, ArtifactUploader, BlobStore};
use crate::mapbox::UploadCredentials;

/// Blob store backed by a map of paths to bytes.
#[derive(Debug, Clone, Default)]
pub struct StubBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl StubBlobStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `contents` at `path`.
    #[must_use]
    pub fn with_blob(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(path.into(), contents.into());
        self
    }
}

impl BlobStore for StubBlobStore {
    fn get_blob(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(path).cloned())
    }
}

/// "Extracts" an archive by writing its bytes to one file.
///
/// Lets tests feed a plain NeTEx document where a zip would be.
#[derive(Debug, Clone)]
pub struct PlainFileExtractor {
    relative_path: Utf8PathBuf,
}

impl PlainFileExtractor {
    /// Write archives to `relative_path` under the target directory.
    #[must_use]
    pub fn new(relative_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}

impl ArchiveExtractor for PlainFileExtractor {
    fn extract(&self, archive: &[u8], target: &Utf8Path) -> io::Result<()> {
        asag_fs::write_file(&target.join(&self.relative_path), archive)
    }
}

/// Uploader that records staged artifacts and their contents.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    staged: RefCell<Vec<(String, Vec<u8>)>>,
}

impl RecordingUploader {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Staged `(key, contents)` pairs.
    #[must_use]
    pub fn staged(&self) -> Vec<(String, Vec<u8>)> {
        self.staged.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ArtifactUploader for RecordingUploader {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        artifact: &Utf8Path,
    ) -> io::Result<()> {
        let mut contents = Vec::new();
        asag_fs::open_utf8_file(artifact)?.read_to_end(&mut contents)?;
        self.staged
            .borrow_mut()
            .push((credentials.key.clone(), contents));
        Ok(())
    }
}
