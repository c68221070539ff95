//! Adapters and pipelines for publishing NeTEx stop registers as tilesets.
//!
//! Responsibilities:
//! - Stream NeTEx documents into typed entities ([`netex`]).
//! - Collect, resolve, map and assemble them into GeoJSON ([`collect`],
//!   [`transform`]).
//! - Talk to the tileset upload service and poll uploads ([`mapbox`]).
//! - Announce runs ([`notify`]) and sequence whole publications
//!   ([`publish`]).
//!
//! Boundaries:
//! - Domain rules live in `asag-core`; this crate only moves data.
//! - Network calls are async behind `?Send` traits; callers supply the
//!   runtime.
//!
//! Invariants:
//! - No global mutable state; every run builds its own buffers.

pub mod collect;
pub mod mapbox;
pub mod netex;
pub mod notify;
pub mod publish;
pub mod transform;

pub use collect::{CollectSummary, CollectedEntities, EntityCollector};
pub use netex::{NetexCursor, ParseError};
pub use transform::{
    TransformError, TransformOptions, TransformOutput, TransformReport, transform_document,
};
