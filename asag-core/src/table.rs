//! Id-indexed entity storage with deterministic iteration.

use std::collections::HashMap;

use crate::entity::Identified;

/// What to do when an id is seen twice in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateIdPolicy {
    /// Keep every occurrence; lookups by id return the first.
    #[default]
    KeepAll,
    /// Replace the earlier occurrence in place.
    KeepLast,
}

/// Result of [`EntityTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The id was new.
    Inserted,
    /// The id was already present and both entries are kept.
    Duplicate,
    /// The id was already present and the old entry was replaced.
    Replaced,
}

/// Arena of entities plus an id index.
///
/// Iteration follows insertion (document) order regardless of policy.
///
/// # Examples
///
/// ```
/// use asag_core::{DuplicateIdPolicy, EntityTable, Insertion, TariffZone, Zone};
///
/// let mut table = EntityTable::new(DuplicateIdPolicy::KeepLast);
/// table.insert(TariffZone { zone: Zone::new("NSR:TariffZone:1") });
/// let outcome = table.insert(TariffZone { zone: Zone::new("NSR:TariffZone:1") });
///
/// assert_eq!(outcome, Insertion::Replaced);
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct EntityTable<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
    policy: DuplicateIdPolicy,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new(DuplicateIdPolicy::default())
    }
}

impl<T> EntityTable<T> {
    /// Create an empty table.
    #[must_use]
    pub fn new(policy: DuplicateIdPolicy) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Consume the table, returning entries in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.entries
    }
}

impl<T: Identified> EntityTable<T> {
    /// Store an entity according to the table's duplicate policy.
    pub fn insert(&mut self, entity: T) -> Insertion {
        let Some(&position) = self.index.get(entity.id()) else {
            self.index.insert(entity.id().to_owned(), self.entries.len());
            self.entries.push(entity);
            return Insertion::Inserted;
        };

        match self.policy {
            DuplicateIdPolicy::KeepAll => {
                self.entries.push(entity);
                Insertion::Duplicate
            }
            DuplicateIdPolicy::KeepLast => {
                if let Some(slot) = self.entries.get_mut(position) {
                    *slot = entity;
                }
                Insertion::Replaced
            }
        }
    }

    /// Look up the indexed entry for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index
            .get(id)
            .and_then(|&position| self.entries.get(position))
    }
}

impl<'a, T> IntoIterator for &'a EntityTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
