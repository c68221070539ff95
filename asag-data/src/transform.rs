//! NeTEx to GeoJSON transform pipeline.
//!
//! Cursor and collector run in one pass over the document. Adjacency is
//! resolved afterwards, once every stop place is known, and the mapped
//! features are assembled into a single in-memory buffer.

use std::io::BufRead;

use asag_core::{
    AssembleError, DuplicateIdPolicy, Feature, FeatureGroups, StopPlaceFeatures, assemble,
    local_now, map_parking, map_quay, map_stop_place, map_tariff_zone, resolve_stop_places,
};
use chrono::NaiveDateTime;
use log::{info, warn};
use thiserror::Error;

use crate::collect::{CollectSummary, CollectedEntities, EntityCollector};
use crate::netex::{NetexCursor, ParseError};

/// Number of mapped entities of one type between progress lines.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Errors that abort a transform. No output is produced in either case.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    /// The document could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The feature collection could not be written.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Knobs for one transform run.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    /// Instant validity windows are evaluated against.
    pub now: NaiveDateTime,
    /// Handling of repeated ids.
    pub duplicate_policy: DuplicateIdPolicy,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            now: local_now(),
            duplicate_policy: DuplicateIdPolicy::default(),
        }
    }
}

impl TransformOptions {
    /// Evaluate validity at a fixed instant.
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Choose how repeated ids are stored.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicateIdPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// What a transform produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// First-pass counters.
    pub collected: CollectSummary,
    /// Stop place features written.
    pub stop_places: usize,
    /// Quay features written.
    pub quays: usize,
    /// Parking features written.
    pub parkings: usize,
    /// Tariff zone features written.
    pub tariff_zones: usize,
    /// Quays skipped for missing geometry.
    pub skipped_quays: usize,
}

impl TransformReport {
    /// Total number of features in the collection.
    #[must_use]
    pub fn features(&self) -> usize {
        self.stop_places + self.quays + self.parkings + self.tariff_zones
    }
}

/// Serialised collection plus its report.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// The `FeatureCollection` document.
    pub geojson: Vec<u8>,
    /// Counters for logging and tests.
    pub report: TransformReport,
}

/// Transform a NeTEx document into a GeoJSON `FeatureCollection`.
///
/// # Errors
///
/// Returns [`TransformError::Parse`] for malformed input and
/// [`TransformError::Assemble`] when serialisation fails.
///
/// # Examples
///
/// ```
/// use asag_data::transform::{TransformOptions, transform_document};
///
/// let xml = r#"<PublicationDelivery><dataObjects><SiteFrame><stopPlaces>
///   <StopPlace id="NSR:StopPlace:1">
///     <Centroid><Location><Longitude>11.39</Longitude><Latitude>59.12</Latitude></Location></Centroid>
///   </StopPlace>
/// </stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#;
///
/// let output = transform_document(xml.as_bytes(), &TransformOptions::default())?;
/// assert_eq!(output.report.features(), 1);
/// # Ok::<(), asag_data::transform::TransformError>(())
/// ```
pub fn transform_document<R: BufRead>(
    reader: R,
    options: &TransformOptions,
) -> Result<TransformOutput, TransformError> {
    let (collected, summary) = EntityCollector::new(options.now)
        .with_duplicate_policy(options.duplicate_policy)
        .collect(NetexCursor::new(reader))?;
    info!(
        "collected {} stop places, {} parkings and {} tariff zones from {} elements",
        collected.stop_places.len(),
        collected.parkings.len(),
        collected.tariff_zones.len(),
        summary.decoded
    );

    let (groups, mut report) = map_collected(&collected);
    report.collected = summary;
    let geojson = assemble(&groups)?;
    info!(
        "wrote {} features ({} stop places, {} quays, {} parkings, {} tariff zones)",
        report.features(),
        report.stop_places,
        report.quays,
        report.parkings,
        report.tariff_zones
    );
    Ok(TransformOutput { geojson, report })
}

/// Resolve and map collected entities into output groups.
#[must_use]
pub fn map_collected(collected: &CollectedEntities) -> (FeatureGroups, TransformReport) {
    let mut report = TransformReport::default();
    let mut groups = FeatureGroups::default();

    let mut progress = Progress::new("stop places");
    for resolved in resolve_stop_places(&collected.stop_places) {
        let Some(stop_place) = map_stop_place(&resolved) else {
            continue;
        };
        let mut quays = Vec::with_capacity(resolved.stop_place.quays.len());
        for quay in &resolved.stop_place.quays {
            match map_quay(quay) {
                Some(feature) => quays.push(feature),
                None => {
                    warn!(
                        "skipping quay {} of {}: neither centroid nor polygon present",
                        quay.zone.id, resolved.stop_place.zone.id
                    );
                    report.skipped_quays += 1;
                }
            }
        }
        report.stop_places += 1;
        report.quays += quays.len();
        groups
            .stop_places
            .push(StopPlaceFeatures { stop_place, quays });
        progress.tick();
    }

    groups.parkings = map_all("parkings", collected.parkings.iter().filter_map(map_parking));
    report.parkings = groups.parkings.len();
    groups.tariff_zones = map_all(
        "tariff zones",
        collected.tariff_zones.iter().filter_map(map_tariff_zone),
    );
    report.tariff_zones = groups.tariff_zones.len();

    (groups, report)
}

fn map_all(label: &'static str, features: impl Iterator<Item = Feature>) -> Vec<Feature> {
    let mut progress = Progress::new(label);
    features
        .inspect(|_| progress.tick())
        .collect()
}

struct Progress {
    label: &'static str,
    count: usize,
}

impl Progress {
    const fn new(label: &'static str) -> Self {
        Self { label, count: 0 }
    }

    fn tick(&mut self) {
        self.count += 1;
        if self.count.is_multiple_of(PROGRESS_INTERVAL) {
            info!("transformed {} {}", self.count, self.label);
        }
    }
}
