//! The hash-keyed label table. Only ever touched through the store's
//! mutex; nothing here locks.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::target::Address;

use super::types::LabelEntry;

/// Labels keyed by module hash. Distinct (module, offset) pairs can share
/// a key; the later write then replaces the earlier entry.
#[derive(Debug, Default)]
pub(super) struct LabelTable {
    entries: HashMap<Address, LabelEntry>,
}

impl LabelTable {
    pub fn get(&self, key: Address) -> Option<&LabelEntry> {
        self.entries.get(&key)
    }

    /// Live write path. The entry goes under `secondary` when that slot is
    /// free; otherwise it overwrites whatever sits under `primary`.
    pub fn insert_live(&mut self, primary: Address, secondary: Address, entry: LabelEntry) {
        if self.entries.contains_key(&secondary) {
            self.entries.insert(primary, entry);
        } else {
            self.entries.insert(secondary, entry);
        }
    }

    /// Load path: keeps an existing entry under `key` and reports whether
    /// `entry` was stored.
    pub fn insert_if_vacant(&mut self, key: Address, entry: LabelEntry) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn remove(&mut self, key: Address) -> Option<LabelEntry> {
        self.entries.remove(&key)
    }

    /// Drop every entry matching `pred`, returning how many went.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&LabelEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !pred(entry));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &LabelEntry> {
        self.entries.values()
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: Address) -> bool {
        self.entries.contains_key(&key)
    }
}
