//! Wire types of the uploads API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Temporary staging credentials returned by the credentials endpoint.
///
/// Fetched fresh for every run and never persisted. `Debug` hides the
/// secrets.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredentials {
    /// Staging bucket.
    pub bucket: String,
    /// Object key inside the bucket.
    pub key: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token.
    pub session_token: String,
    /// URL the upload is initiated from once the object is staged.
    pub url: String,
}

impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Body of the upload-initiation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Target tileset, `<user>.<name>`.
    pub tileset: String,
    /// Staged object URL.
    pub url: String,
    /// Upload name.
    pub name: String,
}

/// Tileset id for `user`, named after `project` or `tileset`.
///
/// # Examples
///
/// ```
/// use asag_data::mapbox::tileset_id;
///
/// assert_eq!(tileset_id("entur", Some("stops")), "entur.stops");
/// assert_eq!(tileset_id("entur", None), "entur.tileset");
/// ```
#[must_use]
pub fn tileset_id(user: &str, project: Option<&str>) -> String {
    format!("{user}.{}", project.unwrap_or("tileset"))
}
