//! Streaming NeTEx reader.
//!
//! National stop registers are large and mostly made of elements this
//! pipeline never uses. The reader scans the document once and decodes only
//! `StopPlace`, `Parking` and `TariffZone` subtrees into typed entities;
//! everything else is skipped as raw events.
#![forbid(unsafe_code)]

mod cursor;
mod decode;
mod element;
mod error;

pub use cursor::NetexCursor;
pub use error::ParseError;

#[cfg(test)]
mod tests;
