//! Mapping of resolved entities onto GeoJSON features.
//!
//! Every mapper returns `None` when the entity has no geometry; features
//! are never built without one.

use geo::{Coord, LineString, Point};

use crate::entity::{EntityKind, GeometrySource, MultilingualText, Parking, Quay, TariffZone, Zone};
use crate::feature::{Feature, FeatureGeometry};
use crate::resolver::ResolvedStopPlace;

/// Derive the feature geometry of a zone.
///
/// A centroid becomes a point; otherwise the polygon ring is reordered from
/// the source's `(lat, lon)` pairs into `(lon, lat)`. The ring keeps exactly
/// the source positions and is not closed.
#[must_use]
pub fn zone_geometry(zone: &Zone) -> Option<FeatureGeometry> {
    match zone.geometry_source()? {
        GeometrySource::Centroid(location) => Some(FeatureGeometry::Point(Point::new(
            location.longitude,
            location.latitude,
        ))),
        GeometrySource::Polygon(positions) => {
            let ring: LineString<f64> = positions
                .pairs()
                .map(|(lat, lon)| Coord { x: lon, y: lat })
                .collect();
            Some(FeatureGeometry::Polygon(ring))
        }
    }
}

/// Prefix before the first `:` of an id shaped like `NSR:StopPlace:1`.
#[must_use]
pub fn code_space(id: &str) -> Option<&str> {
    if id.matches(':').count() != 2 {
        return None;
    }
    id.split(':').next().filter(|prefix| !prefix.is_empty())
}

/// Baseline properties shared by every zone-shaped entity.
#[must_use]
pub fn map_zone(zone: &Zone, kind: EntityKind) -> Option<Feature> {
    let geometry = zone_geometry(zone)?;
    let mut feature = Feature::new(zone.id.clone(), geometry);
    feature.set("id", zone.id.as_str());
    set_multilingual(&mut feature, "name", zone.name.as_ref());
    set_multilingual(&mut feature, "description", zone.description.as_ref());
    feature.set_non_empty("privateCode", zone.private_code.as_deref());
    if let Some(prefix) = code_space(&zone.id) {
        feature.set("codeSpace", prefix);
    }
    feature.set("entityType", kind.as_str());
    Some(feature)
}

fn set_multilingual(feature: &mut Feature, key: &str, text: Option<&MultilingualText>) {
    let Some(text) = text else {
        return;
    };
    feature.set(key, text.value.as_str());
    if let Some(lang) = text.lang.as_deref().filter(|lang| !lang.is_empty()) {
        feature.set(&format!("{key}Lang"), lang);
    }
}

/// Map a resolved stop place.
#[must_use]
pub fn map_stop_place(resolved: &ResolvedStopPlace<'_>) -> Option<Feature> {
    let stop = resolved.stop_place;
    let mut feature = map_zone(&stop.zone, EntityKind::StopPlace)?;
    feature.set_non_empty("submode", resolved.submode);
    if let Some(stop_type) = stop.stop_type {
        feature.set("stopPlaceType", stop_type.as_str());
    }
    feature.set_non_empty("publicCode", stop.public_code.as_deref());
    if let Some(weighting) = stop.weighting {
        feature.set("weighting", weighting.as_str());
    }
    feature.set("hasParentSiteRef", stop.has_parent_site_ref);
    feature.set_non_empty("isParentStopPlace", stop.is_parent_stop_place.as_deref());
    if !resolved.adjacent_sites.is_empty() {
        feature.set("adjacentSites", resolved.adjacent_sites.clone());
    }
    if let Some(primary) = resolved.is_primary {
        feature.set("isPrimaryAdjacentSite", primary);
    }
    feature.set_non_empty("finalStopPlaceType", resolved.final_type.as_deref());
    Some(feature)
}

/// Map a quay nested in a stop place.
#[must_use]
pub fn map_quay(quay: &Quay) -> Option<Feature> {
    let mut feature = map_zone(&quay.zone, EntityKind::Quay)?;
    feature.set_non_empty("publicCode", quay.public_code.as_deref());
    Some(feature)
}

/// Map a parking.
#[must_use]
pub fn map_parking(parking: &Parking) -> Option<Feature> {
    let mut feature = map_zone(&parking.zone, EntityKind::Parking)?;
    let counts = [
        ("totalCapacity", parking.total_capacity),
        ("principalCapacity", parking.principal_capacity),
        ("numberOfParkingLevels", parking.number_of_parking_levels),
    ];
    for (key, count) in counts {
        if let Some(count) = count {
            feature.set(key, count.to_string());
        }
    }
    feature.set_non_empty("publicCode", parking.public_code.as_deref());
    if let Some(covered) = parking.covered {
        feature.set("covered", covered.as_str());
    }
    let mut vehicle_types: Vec<&str> = parking.vehicle_types.iter().map(String::as_str).collect();
    vehicle_types.sort_unstable();
    feature.set("parkingVehicleTypes", vehicle_types.join(","));
    feature.set("hasParentSiteRef", parking.has_parent_site_ref);
    Some(feature)
}

/// Map a tariff zone.
#[must_use]
pub fn map_tariff_zone(tariff_zone: &TariffZone) -> Option<Feature> {
    map_zone(&tariff_zone.zone, EntityKind::TariffZone)
}
