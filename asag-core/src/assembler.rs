//! Assembly of the output `FeatureCollection` document.
//!
//! Features are written group by group: stop places each followed by their
//! quays, then parkings, then tariff zones. A separator is written after a
//! feature only when another feature follows, either in the same group or
//! in a later non-empty one.

use std::io::{self, Write};

use thiserror::Error;

use crate::feature::Feature;

const HEADER: &[u8] = b"{\n\"features\": [\n";
const SEPARATOR: &[u8] = b",\n";
const FOOTER: &[u8] = b"\n], \"type\": \"FeatureCollection\"\n}";
const EMPTY_FOOTER: &[u8] = b"], \"type\": \"FeatureCollection\"\n}";

/// Errors raised while writing the collection.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A feature could not be serialised.
    #[error("failed to serialise feature {id}: {source}")]
    Serialise {
        /// Id of the offending feature.
        id: String,
        /// Serialiser error.
        #[source]
        source: serde_json::Error,
    },
    /// The sink rejected a write.
    #[error("failed to write feature collection: {source}")]
    Write {
        /// I/O error from the sink.
        #[source]
        source: io::Error,
    },
}

/// A stop place feature followed by its quay features.
#[derive(Debug, Clone, PartialEq)]
pub struct StopPlaceFeatures {
    /// The stop itself.
    pub stop_place: Feature,
    /// Its quays, in document order.
    pub quays: Vec<Feature>,
}

/// All features of one run, grouped in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGroups {
    /// Stop places with quays.
    pub stop_places: Vec<StopPlaceFeatures>,
    /// Parkings.
    pub parkings: Vec<Feature>,
    /// Tariff zones.
    pub tariff_zones: Vec<Feature>,
}

impl FeatureGroups {
    /// Total number of features across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        let stops: usize = self
            .stop_places
            .iter()
            .map(|entry| 1 + entry.quays.len())
            .sum();
        stops + self.parkings.len() + self.tariff_zones.len()
    }

    /// Return whether no feature was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ordered_groups(&self) -> [Vec<&Feature>; 3] {
        let stops = self
            .stop_places
            .iter()
            .flat_map(|entry| std::iter::once(&entry.stop_place).chain(entry.quays.iter()))
            .collect();
        [
            stops,
            self.parkings.iter().collect(),
            self.tariff_zones.iter().collect(),
        ]
    }
}

/// Write the collection to `sink`, returning the number of features written.
///
/// # Errors
///
/// Returns [`AssembleError`] when serialisation or the sink fails.
pub fn write_feature_collection<W: Write>(
    sink: &mut W,
    groups: &FeatureGroups,
) -> Result<usize, AssembleError> {
    write_raw(sink, HEADER)?;
    let ordered = groups.ordered_groups();
    let mut written = 0usize;
    for (position, group) in ordered.iter().enumerate() {
        let later_features = ordered
            .iter()
            .skip(position + 1)
            .any(|later| !later.is_empty());
        for (offset, feature) in group.iter().enumerate() {
            serde_json::to_writer(&mut *sink, &feature.to_geojson()).map_err(|source| {
                AssembleError::Serialise {
                    id: feature.id.clone(),
                    source,
                }
            })?;
            written += 1;
            let more_in_group = offset + 1 < group.len();
            if more_in_group || later_features {
                write_raw(sink, SEPARATOR)?;
            }
        }
    }
    let footer = if written == 0 { EMPTY_FOOTER } else { FOOTER };
    write_raw(sink, footer)?;
    Ok(written)
}

/// Assemble the collection into an in-memory buffer.
///
/// # Errors
///
/// Returns [`AssembleError`] when a feature cannot be serialised.
pub fn assemble(groups: &FeatureGroups) -> Result<Vec<u8>, AssembleError> {
    let mut buffer = Vec::with_capacity(groups.len().saturating_mul(512));
    write_feature_collection(&mut buffer, groups)?;
    Ok(buffer)
}

fn write_raw<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<(), AssembleError> {
    sink.write_all(bytes)
        .map_err(|source| AssembleError::Write { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureGeometry;
    use geo::Point;
    use rstest::rstest;

    fn feature(id: &str) -> Feature {
        let mut feature = Feature::new(id, FeatureGeometry::Point(Point::new(10.0, 59.0)));
        feature.set("id", id);
        feature
    }

    fn ids(bytes: &[u8]) -> Vec<String> {
        let text = std::str::from_utf8(bytes).expect("utf-8 output");
        let geojson::GeoJson::FeatureCollection(collection) =
            text.parse::<geojson::GeoJson>().expect("valid geojson")
        else {
            panic!("expected a feature collection");
        };
        collection
            .features
            .into_iter()
            .filter_map(|feature| match feature.id {
                Some(geojson::feature::Id::String(id)) => Some(id),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    fn empty_collection_is_valid_json() {
        let bytes = assemble(&FeatureGroups::default()).expect("assemble");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"], serde_json::json!([]));
    }

    #[rstest]
    fn groups_are_written_in_order() {
        let groups = FeatureGroups {
            stop_places: vec![
                StopPlaceFeatures {
                    stop_place: feature("NSR:StopPlace:1"),
                    quays: Vec::new(),
                },
                StopPlaceFeatures {
                    stop_place: feature("NSR:StopPlace:10"),
                    quays: vec![feature("NSR:Quay:8")],
                },
            ],
            parkings: vec![feature("NSR:Parking:99")],
            tariff_zones: Vec::new(),
        };

        let bytes = assemble(&groups).expect("assemble");

        assert_eq!(
            ids(&bytes),
            vec![
                "NSR:StopPlace:1",
                "NSR:StopPlace:10",
                "NSR:Quay:8",
                "NSR:Parking:99"
            ]
        );
    }

    #[rstest]
    #[case::only_stops(1, 0, 0)]
    #[case::only_parkings(0, 2, 0)]
    #[case::only_zones(0, 0, 3)]
    #[case::stops_and_zones(2, 0, 1)]
    #[case::all(1, 1, 1)]
    fn separators_follow_group_boundaries(
        #[case] stops: usize,
        #[case] parkings: usize,
        #[case] zones: usize,
    ) {
        let groups = FeatureGroups {
            stop_places: (0..stops)
                .map(|n| StopPlaceFeatures {
                    stop_place: feature(&format!("S:{n}")),
                    quays: Vec::new(),
                })
                .collect(),
            parkings: (0..parkings).map(|n| feature(&format!("P:{n}"))).collect(),
            tariff_zones: (0..zones).map(|n| feature(&format!("T:{n}"))).collect(),
        };

        let mut sink = Vec::new();
        let written = write_feature_collection(&mut sink, &groups).expect("assemble");

        assert_eq!(written, stops + parkings + zones);
        assert_eq!(ids(&sink).len(), written);
    }

    #[rstest]
    fn sink_failures_are_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = write_feature_collection(&mut Broken, &FeatureGroups::default())
            .expect_err("write should fail");
        assert!(matches!(err, AssembleError::Write { .. }));
    }
}
