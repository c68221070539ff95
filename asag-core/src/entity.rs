//! Decoded NeTEx entities.
//!
//! Entities are built once per decoded element and never mutated
//! afterwards. Every entity shares a [`Zone`] baseline; the concrete
//! shapes add their own attributes on top.

use std::fmt;

use crate::codes::{CoveredCode, InterchangeWeighting, StopType, Submode};
use crate::validity::ValidityWindow;

/// Key under which NeTEx key lists flag parent stop places.
pub const IS_PARENT_STOP_PLACE_KEY: &str = "IS_PARENT_STOP_PLACE";

/// Free text with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilingualText {
    /// The text itself.
    pub value: String,
    /// Language tag such as `nor`.
    pub lang: Option<String>,
}

impl MultilingualText {
    /// Build a text without a language tag.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: None,
        }
    }

    /// Attach a language tag.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

/// A WGS84 position as written in a NeTEx `Location`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

/// Flattened GML `posList`, in source order (`lat lon lat lon ...`).
///
/// The decoder guarantees an even number of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionList(Vec<f64>);

impl PositionList {
    /// Wrap a flat list of values. Returns `None` when the count is odd.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Option<Self> {
        (values.len() % 2 == 0).then_some(Self(values))
    }

    /// Iterate over `(lat, lon)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0
            .chunks_exact(2)
            .filter_map(|pair| match pair {
                [lat, lon] => Some((*lat, *lon)),
                _ => None,
            })
    }

    /// Return whether the list holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where an entity's geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometrySource<'a> {
    /// A single centroid location.
    Centroid(Location),
    /// The exterior ring of a polygon.
    Polygon(&'a PositionList),
}

/// Attributes every zone-shaped entity carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zone {
    /// Globally unique NeTEx id, e.g. `NSR:StopPlace:1`.
    pub id: String,
    /// Display name.
    pub name: Option<MultilingualText>,
    /// Description.
    pub description: Option<MultilingualText>,
    /// Private code, if any.
    pub private_code: Option<String>,
    /// Validity windows in document order.
    pub validity: Vec<ValidityWindow>,
    /// Centroid location.
    pub centroid: Option<Location>,
    /// Polygon exterior ring.
    pub polygon: Option<PositionList>,
}

impl Zone {
    /// Build an empty zone with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Geometry to emit: the centroid wins over the polygon.
    #[must_use]
    pub fn geometry_source(&self) -> Option<GeometrySource<'_>> {
        if let Some(centroid) = self.centroid {
            return Some(GeometrySource::Centroid(centroid));
        }
        self.polygon
            .as_ref()
            .filter(|polygon| !polygon.is_empty())
            .map(GeometrySource::Polygon)
    }

    /// Return whether the zone can be turned into a feature.
    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.geometry_source().is_some()
    }
}

/// Boarding position nested inside a stop place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quay {
    /// Zone baseline.
    pub zone: Zone,
    /// Public code painted on the platform.
    pub public_code: Option<String>,
}

/// A named transit access point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopPlace {
    /// Zone baseline.
    pub zone: Zone,
    /// Generic stop type.
    pub stop_type: Option<StopType>,
    /// Submode fields in document order.
    pub submodes: Vec<Submode>,
    /// Interchange weighting.
    pub weighting: Option<InterchangeWeighting>,
    /// Public code.
    pub public_code: Option<String>,
    /// Whether a `ParentSiteRef` was present.
    pub has_parent_site_ref: bool,
    /// Ids referenced from `adjacentSites`.
    pub adjacent_site_refs: Vec<String>,
    /// Value of the `IS_PARENT_STOP_PLACE` key, when set.
    pub is_parent_stop_place: Option<String>,
    /// Nested quays in document order.
    pub quays: Vec<Quay>,
}

/// A car, bicycle or other vehicle parking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parking {
    /// Zone baseline.
    pub zone: Zone,
    /// Total number of spaces.
    pub total_capacity: Option<u64>,
    /// Spaces for the principal vehicle type.
    pub principal_capacity: Option<u64>,
    /// Number of levels.
    pub number_of_parking_levels: Option<u64>,
    /// Public code.
    pub public_code: Option<String>,
    /// Shelter classification.
    pub covered: Option<CoveredCode>,
    /// Accepted vehicle types, as written in the source.
    pub vehicle_types: Vec<String>,
    /// Whether a `ParentSiteRef` was present.
    pub has_parent_site_ref: bool,
}

/// A fare zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TariffZone {
    /// Zone baseline.
    pub zone: Zone,
}

/// Type tag of every shape that ends up as a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// `StopPlace`.
    StopPlace,
    /// `Quay`, only ever nested in a stop place.
    Quay,
    /// `Parking`.
    Parking,
    /// `TariffZone`.
    TariffZone,
}

impl EntityKind {
    /// Kinds decoded from top-level elements.
    pub const COLLECTED: [Self; 3] = [Self::StopPlace, Self::Parking, Self::TariffZone];

    /// Element and `entityType` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StopPlace => "StopPlace",
            Self::Quay => "Quay",
            Self::Parking => "Parking",
            Self::TariffZone => "TariffZone",
        }
    }

    /// Map an element's local name to a collected kind.
    #[must_use]
    pub fn from_element_name(name: &[u8]) -> Option<Self> {
        Self::COLLECTED
            .into_iter()
            .find(|kind| kind.as_str().as_bytes() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded top-level entity.
#[derive(Debug, Clone, PartialEq)]
pub enum NetexEntity {
    /// A stop place with its quays.
    StopPlace(StopPlace),
    /// A parking.
    Parking(Parking),
    /// A tariff zone.
    TariffZone(TariffZone),
}

impl NetexEntity {
    /// Shared zone baseline.
    #[must_use]
    pub const fn zone(&self) -> &Zone {
        match self {
            Self::StopPlace(stop) => &stop.zone,
            Self::Parking(parking) => &parking.zone,
            Self::TariffZone(zone) => &zone.zone,
        }
    }

    /// Concrete type tag.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::StopPlace(_) => EntityKind::StopPlace,
            Self::Parking(_) => EntityKind::Parking,
            Self::TariffZone(_) => EntityKind::TariffZone,
        }
    }
}

/// Entities addressable by their NeTEx id.
pub trait Identified {
    /// NeTEx id.
    fn id(&self) -> &str;
}

impl Identified for Zone {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for StopPlace {
    fn id(&self) -> &str {
        &self.zone.id
    }
}

impl Identified for Parking {
    fn id(&self) -> &str {
        &self.zone.id
    }
}

impl Identified for TariffZone {
    fn id(&self) -> &str {
        &self.zone.id
    }
}

impl Identified for Quay {
    fn id(&self) -> &str {
        &self.zone.id
    }
}
