//! Test helpers for laying out NeTEx exports on disk.

use asag_data::TransformOptions;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const STOP_PLACE_EXPORT: &str = r#"<PublicationDelivery><dataObjects><SiteFrame><stopPlaces>
  <StopPlace id="NSR:StopPlace:1">
    <Name>Ski</Name>
    <Centroid><Location><Longitude>11.39</Longitude><Latitude>59.12</Latitude></Location></Centroid>
    <StopPlaceType>railStation</StopPlaceType>
  </StopPlace>
</stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#;

pub(super) const TRUNCATED_EXPORT: &str =
    r#"<PublicationDelivery><StopPlace id="NSR:StopPlace:1"><Name>Ski</Name>"#;

/// Temporary directory holding exports and outputs.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace path");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    pub(super) fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        asag_fs::write_file(&path, contents.as_bytes()).expect("write workspace file");
        path
    }

    pub(super) fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read workspace file")
    }
}

/// Options pinned to 2024-06-01 12:00 so validity windows are stable.
pub(super) fn options() -> TransformOptions {
    let now = "2024-06-01T12:00:00".parse().expect("valid timestamp");
    TransformOptions::at(now)
}
