//! Errors produced while reading NeTEx documents.

use asag_core::{EntityKind, UnknownCode};
use thiserror::Error;

/// Fatal problems with the document or a recognised element.
///
/// Any of these aborts the run; no partial output is written.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The XML itself is malformed.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        /// Byte offset reported by the reader.
        position: u64,
        /// Reader error.
        #[source]
        source: quick_xml::Error,
    },
    /// The document ended inside a recognised element.
    #[error("document ended inside {kind} element")]
    UnexpectedEof {
        /// Element being decoded.
        kind: EntityKind,
    },
    /// A nested-only element was asked to decode on its own.
    #[error("{kind} is not decoded as a top-level element")]
    NotTopLevel {
        /// Element kind.
        kind: EntityKind,
    },
    /// A required attribute or child element is absent.
    #[error("{kind} {id:?} is missing {field}")]
    Missing {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id, when already known.
        id: Option<String>,
        /// Name of the missing attribute or element.
        field: &'static str,
    },
    /// A numeric field did not parse.
    #[error("{kind} {id} has invalid {field} {value:?}")]
    InvalidNumber {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id.
        id: String,
        /// Field name.
        field: &'static str,
        /// Raw text.
        value: String,
    },
    /// A coordinate is out of range or not finite.
    #[error("{kind} {id} has coordinate {value} outside the valid {field} range")]
    InvalidCoordinate {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id.
        id: String,
        /// `Latitude` or `Longitude`.
        field: &'static str,
        /// Parsed value.
        value: f64,
    },
    /// A `FromDate`/`ToDate` value is not a recognised timestamp.
    #[error("{kind} {id} has invalid {field} {value:?}")]
    InvalidTimestamp {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id.
        id: String,
        /// Field name.
        field: &'static str,
        /// Raw text.
        value: String,
    },
    /// A value lies outside its closed code list.
    #[error("{kind} {id}: {source}")]
    UnknownCode {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id.
        id: String,
        /// Code list error.
        #[source]
        source: UnknownCode,
    },
    /// A `posList` holds an odd number of values.
    #[error("{kind} {id} has a posList with an odd number ({count}) of values")]
    OddPositionList {
        /// Element being decoded.
        kind: EntityKind,
        /// Entity id.
        id: String,
        /// Number of values found.
        count: usize,
    },
}
