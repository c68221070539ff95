//! First pass: buffer valid, geometry-bearing entities per type.
//!
//! The collector is consumed by [`EntityCollector::collect`]; every run
//! builds a fresh one so tables never leak between transforms.

use asag_core::{
    DuplicateIdPolicy, EntityTable, Insertion, NetexEntity, Parking, StopPlace, TariffZone,
    is_valid_at,
};
use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::netex::ParseError;

/// Entities that survived the first pass, in document order.
#[derive(Debug, Clone)]
pub struct CollectedEntities {
    /// Stop places, quays nested inside.
    pub stop_places: EntityTable<StopPlace>,
    /// Parkings.
    pub parkings: EntityTable<Parking>,
    /// Tariff zones.
    pub tariff_zones: EntityTable<TariffZone>,
}

/// Counters describing what the first pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Recognised elements decoded.
    pub decoded: usize,
    /// Entities dropped because no validity window covers `now`.
    pub expired: usize,
    /// Entities dropped because they have neither centroid nor polygon.
    pub missing_geometry: usize,
    /// Entities whose id was already collected.
    pub duplicates: usize,
}

/// Buffers decoded entities for one transform run.
#[derive(Debug, Clone, Copy)]
pub struct EntityCollector {
    now: NaiveDateTime,
    policy: DuplicateIdPolicy,
}

impl EntityCollector {
    /// Create a collector evaluating validity at `now`.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            policy: DuplicateIdPolicy::default(),
        }
    }

    /// Choose how repeated ids are stored.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicateIdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drain `entities`, keeping the valid ones that carry geometry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] yielded by `entities`; nothing
    /// collected so far is returned in that case.
    pub fn collect<I>(self, entities: I) -> Result<(CollectedEntities, CollectSummary), ParseError>
    where
        I: IntoIterator<Item = Result<NetexEntity, ParseError>>,
    {
        let mut collected = CollectedEntities {
            stop_places: EntityTable::new(self.policy),
            parkings: EntityTable::new(self.policy),
            tariff_zones: EntityTable::new(self.policy),
        };
        let mut summary = CollectSummary::default();

        for entity in entities {
            let entity = entity?;
            summary.decoded += 1;
            let zone = entity.zone();
            if !is_valid_at(&zone.validity, self.now) {
                debug!("skipping {} {}: not valid now", entity.kind(), zone.id);
                summary.expired += 1;
                continue;
            }
            if !zone.has_geometry() {
                warn!(
                    "skipping {} {}: neither centroid nor polygon present",
                    entity.kind(),
                    zone.id
                );
                summary.missing_geometry += 1;
                continue;
            }
            let kind = entity.kind();
            let id = zone.id.clone();
            let insertion = match entity {
                NetexEntity::StopPlace(stop) => collected.stop_places.insert(stop),
                NetexEntity::Parking(parking) => collected.parkings.insert(parking),
                NetexEntity::TariffZone(zone) => collected.tariff_zones.insert(zone),
            };
            match insertion {
                Insertion::Inserted => {}
                Insertion::Duplicate => {
                    warn!("{kind} {id} appears more than once; keeping every occurrence");
                    summary.duplicates += 1;
                }
                Insertion::Replaced => {
                    warn!("{kind} {id} appears more than once; keeping the last occurrence");
                    summary.duplicates += 1;
                }
            }
        }

        Ok((collected, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asag_core::{Location, ValidityWindow, Zone};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn located(id: &str) -> Zone {
        let mut zone = Zone::new(id);
        zone.centroid = Some(Location {
            longitude: 10.0,
            latitude: 60.0,
        });
        zone
    }

    fn tariff_zone(zone: Zone) -> Result<NetexEntity, ParseError> {
        Ok(NetexEntity::TariffZone(TariffZone { zone }))
    }

    #[rstest]
    fn drops_entities_without_geometry(now: NaiveDateTime) {
        let input = vec![
            tariff_zone(located("NSR:TariffZone:1")),
            tariff_zone(Zone::new("NSR:TariffZone:2")),
        ];

        let (collected, summary) = EntityCollector::new(now).collect(input).expect("collect");

        assert_eq!(collected.tariff_zones.len(), 1);
        assert_eq!(summary.missing_geometry, 1);
        assert_eq!(summary.decoded, 2);
    }

    #[rstest]
    fn drops_expired_entities(now: NaiveDateTime) {
        let mut expired = located("NSR:TariffZone:3");
        expired.validity = vec![ValidityWindow::new(None, Some(now - chrono::Duration::days(1)))];

        let (collected, summary) = EntityCollector::new(now)
            .collect(vec![tariff_zone(expired)])
            .expect("collect");

        assert!(collected.tariff_zones.is_empty());
        assert_eq!(summary.expired, 1);
    }

    #[rstest]
    #[case(DuplicateIdPolicy::KeepAll, 2)]
    #[case(DuplicateIdPolicy::KeepLast, 1)]
    fn applies_duplicate_policy(
        now: NaiveDateTime,
        #[case] policy: DuplicateIdPolicy,
        #[case] expected: usize,
    ) {
        let input = vec![
            tariff_zone(located("NSR:TariffZone:4")),
            tariff_zone(located("NSR:TariffZone:4")),
        ];

        let (collected, summary) = EntityCollector::new(now)
            .with_duplicate_policy(policy)
            .collect(input)
            .expect("collect");

        assert_eq!(collected.tariff_zones.len(), expected);
        assert_eq!(summary.duplicates, 1);
    }

    #[rstest]
    fn propagates_parse_errors(now: NaiveDateTime) {
        let input = vec![
            tariff_zone(located("NSR:TariffZone:5")),
            Err(ParseError::NotTopLevel {
                kind: asag_core::EntityKind::Quay,
            }),
        ];

        let result = EntityCollector::new(now).collect(input);

        assert!(matches!(result, Err(ParseError::NotTopLevel { .. })));
    }
}
