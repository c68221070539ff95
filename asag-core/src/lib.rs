//! Core domain for turning NeTEx stop registers into map tiles.
//!
//! Responsibilities:
//! - Model the decoded entities (stop places, quays, parkings, tariff zones)
//!   and the closed code lists they use.
//! - Decide temporal validity, resolve stop adjacency, map entities onto
//!   GeoJSON features and assemble the output collection.
//! - Drive the upload status state machine.
//!
//! Boundaries:
//! - No network or filesystem access; adapters live in `asag-data`.
//! - Output is written to caller-supplied `std::io::Write` sinks.
#![forbid(unsafe_code)]

pub mod assembler;
pub mod codes;
pub mod entity;
pub mod feature;
pub mod mapper;
pub mod poll;
pub mod resolver;
pub mod table;
pub mod validity;

pub use assembler::{
    AssembleError, FeatureGroups, StopPlaceFeatures, assemble, write_feature_collection,
};
pub use codes::{CoveredCode, InterchangeWeighting, StopType, Submode, SubmodeKind, UnknownCode};
pub use entity::{
    EntityKind, GeometrySource, IS_PARENT_STOP_PLACE_KEY, Identified, Location, MultilingualText,
    NetexEntity, Parking, PositionList, Quay, StopPlace, TariffZone, Zone,
};
pub use feature::{Feature, FeatureGeometry, PropertyValue};
pub use mapper::{map_parking, map_quay, map_stop_place, map_tariff_zone, map_zone, zone_geometry};
pub use poll::{PollState, UploadStatus};
pub use resolver::{ResolvedStopPlace, base_type, resolve_stop_places};
pub use table::{DuplicateIdPolicy, EntityTable, Insertion};
pub use validity::{ValidityWindow, is_valid_at, is_valid_now, local_now};
