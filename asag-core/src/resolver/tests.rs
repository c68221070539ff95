//! Unit tests for adjacency resolution.

use super::*;
use crate::codes::{StopType, Submode, SubmodeKind};
use crate::entity::Zone;
use crate::table::DuplicateIdPolicy;
use proptest::prelude::*;
use rstest::{fixture, rstest};

fn stop(id: &str, stop_type: StopType, adjacent: &[&str]) -> StopPlace {
    StopPlace {
        zone: Zone::new(id),
        stop_type: Some(stop_type),
        adjacent_site_refs: adjacent.iter().map(|&site| site.to_owned()).collect(),
        ..StopPlace::default()
    }
}

fn table_of(stops: Vec<StopPlace>) -> EntityTable<StopPlace> {
    let mut table = EntityTable::new(DuplicateIdPolicy::KeepAll);
    for entry in stops {
        table.insert(entry);
    }
    table
}

#[fixture]
fn bus_and_rail() -> EntityTable<StopPlace> {
    table_of(vec![
        stop("NSR:StopPlace:X", StopType::OnstreetBus, &["NSR:StopPlace:Y"]),
        stop("NSR:StopPlace:Y", StopType::RailStation, &["NSR:StopPlace:X"]),
    ])
}

#[rstest]
fn primary_carries_composite_type(bus_and_rail: EntityTable<StopPlace>) {
    let resolved = resolve_stop_places(&bus_and_rail);

    let [bus, rail] = resolved.as_slice() else {
        panic!("expected two resolved stops");
    };
    assert_eq!(bus.is_primary, Some(false));
    assert_eq!(bus.final_type.as_deref(), Some("onstreetBus"));
    assert_eq!(rail.is_primary, Some(true));
    assert_eq!(rail.final_type.as_deref(), Some("onstreetBus_railStation"));
}

#[rstest]
fn stops_without_adjacency_keep_their_type() {
    let table = table_of(vec![stop("NSR:StopPlace:1", StopType::FerryStop, &[])]);

    let resolved = resolve_stop_places(&table);

    assert_eq!(resolved[0].is_primary, None);
    assert!(resolved[0].adjacent_sites.is_empty());
    assert_eq!(resolved[0].final_type.as_deref(), Some("ferryStop"));
}

#[rstest]
fn submode_takes_precedence_over_stop_type() {
    let mut entry = stop("NSR:StopPlace:2", StopType::BusStation, &[]);
    entry.submodes = vec![
        Submode::new(SubmodeKind::Bus, "unknown"),
        Submode::new(SubmodeKind::Bus, "airportLinkBus"),
    ];

    assert_eq!(base_type(&entry), Some("airportLinkBus"));
    let table = table_of(vec![entry]);
    let resolved = resolve_stop_places(&table);
    assert_eq!(resolved[0].submode, Some("airportLinkBus"));
    assert_eq!(resolved[0].final_type.as_deref(), Some("airportLinkBus"));
}

#[rstest]
fn adjacent_sites_sort_ignoring_case() {
    let entry = stop(
        "NSR:StopPlace:1",
        StopType::OnstreetBus,
        &["nsr:StopPlace:b", "NSR:StopPlace:A", "NSR:StopPlace:B"],
    );

    assert_eq!(
        sorted_adjacent_sites(&entry),
        vec!["NSR:StopPlace:A".to_owned(), "nsr:StopPlace:b".to_owned()]
    );
}

#[rstest]
fn unresolved_neighbours_add_nothing() {
    let table = table_of(vec![stop(
        "NSR:StopPlace:9",
        StopType::TramStation,
        &["NSR:StopPlace:1"],
    )]);

    let resolved = resolve_stop_places(&table);

    assert_eq!(resolved[0].is_primary, Some(true));
    assert_eq!(resolved[0].final_type.as_deref(), Some("tramStation"));
}

#[rstest]
fn composite_deduplicates_shared_types() {
    let table = table_of(vec![
        stop("A", StopType::OnstreetBus, &["B", "C"]),
        stop("B", StopType::OnstreetBus, &["A", "C"]),
        stop("C", StopType::MetroStation, &["A", "B"]),
    ]);

    let resolved = resolve_stop_places(&table);

    let primaries: Vec<_> = resolved
        .iter()
        .filter(|entry| entry.is_primary == Some(true))
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].stop_place.zone.id, "C");
    assert_eq!(
        primaries[0].final_type.as_deref(),
        Some("metroStation_onstreetBus")
    );
}

proptest! {
    #[test]
    fn fully_connected_clusters_have_exactly_one_primary(
        ids in proptest::collection::btree_set("[A-Z][0-9]{1,3}", 2..6)
    ) {
        let ids: Vec<String> = ids.into_iter().collect();
        let stops = ids
            .iter()
            .map(|id| {
                let others: Vec<&str> = ids
                    .iter()
                    .filter(|other| *other != id)
                    .map(String::as_str)
                    .collect();
                stop(id, StopType::OnstreetBus, &others)
            })
            .collect();
        let table = table_of(stops);

        let resolved = resolve_stop_places(&table);
        let primaries: Vec<&str> = resolved
            .iter()
            .filter(|entry| entry.is_primary == Some(true))
            .map(|entry| entry.stop_place.zone.id.as_str())
            .collect();

        let maximal = ids
            .iter()
            .max_by(|left, right| cmp_ignore_case(left, right))
            .map(String::as_str);
        prop_assert_eq!(primaries.len(), 1);
        prop_assert_eq!(primaries.first().copied(), maximal);
    }
}
