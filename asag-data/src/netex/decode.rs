//! Typed decoding of recognised NeTEx elements.

use std::str::FromStr;

use asag_core::{
    CoveredCode, EntityKind, IS_PARENT_STOP_PLACE_KEY, InterchangeWeighting, Location,
    MultilingualText, NetexEntity, Parking, PositionList, Quay, StopPlace, StopType, Submode,
    SubmodeKind, TariffZone, UnknownCode, ValidityWindow, Zone,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use super::element::XmlElement;
use super::error::ParseError;

const NAIVE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_ONLY: &str = "%Y-%m-%d";

pub(crate) fn decode_entity(
    kind: EntityKind,
    element: &XmlElement,
) -> Result<NetexEntity, ParseError> {
    match kind {
        EntityKind::StopPlace => decode_stop_place(element).map(NetexEntity::StopPlace),
        EntityKind::Parking => decode_parking(element).map(NetexEntity::Parking),
        EntityKind::TariffZone => {
            decode_zone(kind, element).map(|zone| NetexEntity::TariffZone(TariffZone { zone }))
        }
        EntityKind::Quay => Err(ParseError::NotTopLevel { kind }),
    }
}

/// Error context for one element.
#[derive(Clone, Copy)]
struct Context<'a> {
    kind: EntityKind,
    id: &'a str,
}

impl Context<'_> {
    fn code<T>(self, element: &XmlElement, name: &str) -> Result<Option<T>, ParseError>
    where
        T: FromStr<Err = UnknownCode>,
    {
        element
            .child_text(name)
            .map(|text| {
                text.parse::<T>().map_err(|source| ParseError::UnknownCode {
                    kind: self.kind,
                    id: self.id.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    fn count(self, element: &XmlElement, field: &'static str) -> Result<Option<u64>, ParseError> {
        element
            .child_text(field)
            .map(|text| {
                text.parse::<u64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        kind: self.kind,
                        id: self.id.to_owned(),
                        field,
                        value: text.to_owned(),
                    })
            })
            .transpose()
    }

    fn number(self, text: &str, field: &'static str) -> Result<f64, ParseError> {
        text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
            kind: self.kind,
            id: self.id.to_owned(),
            field,
            value: text.to_owned(),
        })
    }

    fn coordinate(
        self,
        location: &XmlElement,
        field: &'static str,
        limit: f64,
    ) -> Result<f64, ParseError> {
        let text = location.child_text(field).ok_or_else(|| ParseError::Missing {
            kind: self.kind,
            id: Some(self.id.to_owned()),
            field,
        })?;
        let value = self.number(text, field)?;
        if !value.is_finite() || value.abs() > limit {
            return Err(ParseError::InvalidCoordinate {
                kind: self.kind,
                id: self.id.to_owned(),
                field,
                value,
            });
        }
        Ok(value)
    }

    fn timestamp(
        self,
        element: &XmlElement,
        field: &'static str,
    ) -> Result<Option<NaiveDateTime>, ParseError> {
        element
            .child_text(field)
            .map(|text| {
                parse_timestamp(text).ok_or_else(|| ParseError::InvalidTimestamp {
                    kind: self.kind,
                    id: self.id.to_owned(),
                    field,
                    value: text.to_owned(),
                })
            })
            .transpose()
    }

    fn validity(self, element: &XmlElement) -> Result<Vec<ValidityWindow>, ParseError> {
        let conditions = element
            .child("validityConditions")
            .into_iter()
            .flat_map(|conditions| conditions.children_named("ValidBetween"));
        element
            .children_named("ValidBetween")
            .chain(conditions)
            .map(|window| -> Result<ValidityWindow, ParseError> {
                Ok(ValidityWindow::new(
                    self.timestamp(window, "FromDate")?,
                    self.timestamp(window, "ToDate")?,
                ))
            })
            .collect()
    }

    fn centroid(self, element: &XmlElement) -> Result<Option<Location>, ParseError> {
        let Some(location) = element.descend(&["Centroid", "Location"]) else {
            return Ok(None);
        };
        Ok(Some(Location {
            longitude: self.coordinate(location, "Longitude", 180.0)?,
            latitude: self.coordinate(location, "Latitude", 90.0)?,
        }))
    }

    fn polygon(self, element: &XmlElement) -> Result<Option<PositionList>, ParseError> {
        let Some(ring) = element.descend(&["Polygon", "exterior", "LinearRing"]) else {
            return Ok(None);
        };
        let raw: Vec<&str> = match ring.child_text("posList") {
            Some(list) => list.split_whitespace().collect(),
            None => ring
                .children_named("pos")
                .filter_map(XmlElement::text)
                .flat_map(str::split_whitespace)
                .collect(),
        };
        let values = raw
            .into_iter()
            .map(|value| self.number(value, "posList"))
            .collect::<Result<Vec<_>, _>>()?;
        let count = values.len();
        PositionList::new(values)
            .map(Some)
            .ok_or_else(|| ParseError::OddPositionList {
                kind: self.kind,
                id: self.id.to_owned(),
                count,
            })
    }
}

/// Parse a NeTEx timestamp into local naive time.
///
/// Accepts RFC 3339 with an offset, a naive date-time, or a bare date.
pub(crate) fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.with_timezone(&Local).naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_TIMESTAMP) {
        return Some(naive);
    }
    NaiveDate::parse_from_str(trimmed, DATE_ONLY)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn multilingual(element: Option<&XmlElement>) -> Option<MultilingualText> {
    let element = element?;
    let value = element.text()?;
    Some(MultilingualText {
        value: value.to_owned(),
        lang: element
            .attribute("lang")
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_owned),
    })
}

fn decode_zone(kind: EntityKind, element: &XmlElement) -> Result<Zone, ParseError> {
    let id = element
        .attribute("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ParseError::Missing {
            kind,
            id: None,
            field: "id",
        })?;
    let context = Context { kind, id };
    Ok(Zone {
        id: id.to_owned(),
        name: multilingual(element.child("Name")),
        description: multilingual(element.child("Description")),
        private_code: element.child_text("PrivateCode").map(str::to_owned),
        validity: context.validity(element)?,
        centroid: context.centroid(element)?,
        polygon: context.polygon(element)?,
    })
}

fn key_value<'a>(element: &'a XmlElement, key: &str) -> Option<&'a str> {
    element
        .child("keyList")?
        .children_named("KeyValue")
        .find(|entry| entry.child_text("Key") == Some(key))
        .and_then(|entry| entry.child_text("Value"))
}

fn decode_quay(element: &XmlElement) -> Result<Quay, ParseError> {
    Ok(Quay {
        zone: decode_zone(EntityKind::Quay, element)?,
        public_code: element.child_text("PublicCode").map(str::to_owned),
    })
}

fn decode_stop_place(element: &XmlElement) -> Result<StopPlace, ParseError> {
    let zone = decode_zone(EntityKind::StopPlace, element)?;
    let context = Context {
        kind: EntityKind::StopPlace,
        id: &zone.id,
    };
    let stop_type = context.code::<StopType>(element, "StopPlaceType")?;
    let weighting = context.code::<InterchangeWeighting>(element, "Weighting")?;
    let submodes = element
        .children()
        .iter()
        .filter_map(|child| {
            let kind = child.name().parse::<SubmodeKind>().ok()?;
            Some(Submode::new(kind, child.text()?))
        })
        .collect();
    let adjacent_site_refs = element
        .child("adjacentSites")
        .map(|sites| {
            sites
                .children()
                .iter()
                .filter_map(|site| site.attribute("ref"))
                .map(str::trim)
                .filter(|reference| !reference.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let quays = element
        .child("quays")
        .map(|quays| {
            quays
                .children_named("Quay")
                .map(decode_quay)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(StopPlace {
        stop_type,
        submodes,
        weighting,
        public_code: element.child_text("PublicCode").map(str::to_owned),
        has_parent_site_ref: element.child("ParentSiteRef").is_some(),
        adjacent_site_refs,
        is_parent_stop_place: key_value(element, IS_PARENT_STOP_PLACE_KEY).map(str::to_owned),
        quays,
        zone,
    })
}

fn decode_parking(element: &XmlElement) -> Result<Parking, ParseError> {
    let zone = decode_zone(EntityKind::Parking, element)?;
    let context = Context {
        kind: EntityKind::Parking,
        id: &zone.id,
    };
    let total_capacity = context.count(element, "TotalCapacity")?;
    let principal_capacity = context.count(element, "PrincipalCapacity")?;
    let number_of_parking_levels = context.count(element, "NumberOfParkingLevels")?;
    let covered = context.code::<CoveredCode>(element, "Covered")?;
    let vehicle_types = element
        .child_text("ParkingVehicleTypes")
        .map(|types| types.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default();

    Ok(Parking {
        total_capacity,
        principal_capacity,
        number_of_parking_levels,
        public_code: element.child_text("PublicCode").map(str::to_owned),
        covered,
        vehicle_types,
        has_parent_site_ref: element.child("ParentSiteRef").is_some(),
        zone,
    })
}
