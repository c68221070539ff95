//! Adjacency-aware stop place type resolution.
//!
//! Stop places that describe the same physical site reference each other
//! through `adjacentSites`. The member with the greatest id is the
//! cluster's primary and carries a composite type such as
//! `onstreetBus_railStation`; every other stop keeps its own type.
//!
//! Adjacency may point forward in the document, so resolution runs over
//! the complete collected table rather than while streaming.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

use crate::entity::StopPlace;
use crate::table::EntityTable;

/// Compare two ids ignoring case.
#[must_use]
pub fn cmp_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

/// The base type of a stop: its first informative submode, else its stop type.
#[must_use]
pub fn base_type(stop: &StopPlace) -> Option<&str> {
    stop.submodes
        .iter()
        .find(|submode| submode.is_known())
        .map(|submode| submode.value.trim())
        .or_else(|| stop.stop_type.map(|stop_type| stop_type.as_str()))
}

/// Adjacent ids sorted case-insensitively, without case-insensitive duplicates.
#[must_use]
pub fn sorted_adjacent_sites(stop: &StopPlace) -> Vec<String> {
    let mut sites: Vec<String> = Vec::with_capacity(stop.adjacent_site_refs.len());
    for reference in &stop.adjacent_site_refs {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Err(position) = sites.binary_search_by(|site| cmp_ignore_case(site, trimmed)) {
            sites.insert(position, trimmed.to_owned());
        }
    }
    sites
}

/// Return whether `id` is the primary member among `adjacent` sites.
#[must_use]
pub fn is_primary(id: &str, adjacent: &[String]) -> bool {
    !adjacent
        .iter()
        .any(|site| cmp_ignore_case(site, id) == Ordering::Greater)
}

/// A stop place with its adjacency resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStopPlace<'a> {
    /// The collected stop.
    pub stop_place: &'a StopPlace,
    /// First informative submode, if any.
    pub submode: Option<&'a str>,
    /// Sorted adjacent ids.
    pub adjacent_sites: Vec<String>,
    /// Primary flag; `None` without adjacency.
    pub is_primary: Option<bool>,
    /// Type emitted as `finalStopPlaceType`.
    pub final_type: Option<String>,
}

/// Resolve every stop in `table`, in table order.
///
/// # Examples
///
/// ```
/// use asag_core::{DuplicateIdPolicy, EntityTable, StopPlace, StopType, Zone, resolve_stop_places};
///
/// let stop = |id: &str, stop_type, adjacent: &str| StopPlace {
///     zone: Zone::new(id),
///     stop_type: Some(stop_type),
///     adjacent_site_refs: vec![adjacent.to_owned()],
///     ..StopPlace::default()
/// };
/// let mut table = EntityTable::new(DuplicateIdPolicy::KeepAll);
/// table.insert(stop("X", StopType::OnstreetBus, "Y"));
/// table.insert(stop("Y", StopType::RailStation, "X"));
///
/// let resolved = resolve_stop_places(&table);
/// assert_eq!(resolved[0].final_type.as_deref(), Some("onstreetBus"));
/// assert_eq!(resolved[1].final_type.as_deref(), Some("onstreetBus_railStation"));
/// ```
#[must_use]
pub fn resolve_stop_places(table: &EntityTable<StopPlace>) -> Vec<ResolvedStopPlace<'_>> {
    let index = build_type_index(table);
    table
        .iter()
        .map(|stop| resolve_one(stop, &index))
        .collect()
}

fn build_type_index(table: &EntityTable<StopPlace>) -> HashMap<&str, Option<&str>> {
    let mut index = HashMap::with_capacity(table.len());
    for stop in table {
        index
            .entry(stop.zone.id.as_str())
            .or_insert_with(|| base_type(stop));
    }
    index
}

fn resolve_one<'a>(
    stop: &'a StopPlace,
    index: &HashMap<&str, Option<&'a str>>,
) -> ResolvedStopPlace<'a> {
    let own_type = base_type(stop);
    let submode = stop
        .submodes
        .iter()
        .find(|submode| submode.is_known())
        .map(|submode| submode.value.trim());
    let adjacent_sites = sorted_adjacent_sites(stop);

    if adjacent_sites.is_empty() {
        return ResolvedStopPlace {
            stop_place: stop,
            submode,
            adjacent_sites,
            is_primary: None,
            final_type: own_type.map(str::to_owned),
        };
    }

    let primary = is_primary(&stop.zone.id, &adjacent_sites);
    let final_type = if primary {
        composite_type(own_type, &adjacent_sites, index)
    } else {
        own_type.map(str::to_owned)
    };

    ResolvedStopPlace {
        stop_place: stop,
        submode,
        adjacent_sites,
        is_primary: Some(primary),
        final_type,
    }
}

fn composite_type(
    own_type: Option<&str>,
    adjacent_sites: &[String],
    index: &HashMap<&str, Option<&str>>,
) -> Option<String> {
    let neighbour_types = adjacent_sites.iter().filter_map(|site| {
        let resolved = index.get(site.as_str()).copied().flatten();
        if resolved.is_none() {
            log::debug!("adjacent site {site} has no resolvable type");
        }
        resolved
    });
    let types: BTreeSet<&str> = own_type.into_iter().chain(neighbour_types).collect();
    if types.is_empty() {
        return None;
    }
    Some(types.into_iter().collect::<Vec<_>>().join("_"))
}

#[cfg(test)]
mod tests;
