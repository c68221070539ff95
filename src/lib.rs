//! Facade crate for the NeTEx stop register tileset tooling.
//!
//! This crate re-exports the core domain types and exposes the transform and
//! upload adapters behind the `data` feature.

#![forbid(unsafe_code)]

pub use asag_core::{
    AssembleError, DuplicateIdPolicy, EntityTable, Feature, FeatureGeometry, NetexEntity,
    Parking, PollState, PropertyValue, Quay, StopPlace, TariffZone, UploadStatus,
    ValidityWindow, is_valid_at, resolve_stop_places,
};

#[cfg(feature = "data")]
pub use asag_data::{
    NetexCursor, ParseError, TransformError, TransformOptions, TransformOutput, TransformReport,
    transform_document,
};

#[cfg(feature = "data")]
pub use asag_data::mapbox::{
    HttpUploadApi, HttpUploadApiConfig, PollOutcome, PollSettings, TransportError, UploadApi,
    poll_until_terminal,
};

#[cfg(feature = "data")]
pub use asag_data::publish::{PublishError, PublishReport, PublishSettings, Publisher};
