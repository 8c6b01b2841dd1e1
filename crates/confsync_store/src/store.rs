//! The shared configuration store.

use crate::entry::{AppliedChange, ConfigEntry};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Nested section map. `BTreeMap` keeps sections and keys sorted so that
/// snapshots come out in a stable section-then-key order.
pub(crate) type SectionMap = BTreeMap<String, BTreeMap<String, String>>;

/// Thread-safe mapping from section name to key/value pairs.
///
/// The store is the only state shared between the outbound push path and the
/// inbound listener; every read and write goes through these synchronized
/// accessors. Each operation takes the lock exactly once, so no partial
/// update is ever visible to a concurrent reader.
///
/// # Example
///
/// ```
/// use confsync_store::ConfigStore;
///
/// let store = ConfigStore::new();
/// store.set("NETWORK", "PORT", "9000");
/// assert_eq!(store.get("NETWORK", "PORT", ""), "9000");
/// assert_eq!(store.get("NETWORK", "MISSING", "fallback"), "fallback");
/// ```
#[derive(Debug, Default)]
pub struct ConfigStore {
    sections: RwLock<SectionMap>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            sections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a store seeded from a loader-supplied section map.
    pub fn from_sections(sections: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self {
            sections: RwLock::new(sections),
        }
    }

    /// Returns the value for `section`/`key`, or `default` if absent.
    ///
    /// This operation never fails: a missing section or key resolves to the
    /// caller-supplied default.
    pub fn get(&self, section: &str, key: &str, default: &str) -> String {
        self.sections
            .read()
            .get(section)
            .and_then(|keys| keys.get(key))
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Sets `section`/`key` to `value`, creating the section and key as
    /// needed and overwriting any previous value.
    pub fn set(&self, section: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        self.sections
            .write()
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Returns a consistent point-in-time copy of every entry, sorted by
    /// section then key.
    pub fn snapshot(&self) -> Vec<ConfigEntry> {
        let sections = self.sections.read();
        let mut entries = Vec::new();
        for (section, keys) in sections.iter() {
            for (key, value) in keys {
                entries.push(ConfigEntry::new(section.clone(), key.clone(), value.clone()));
            }
        }
        entries
    }

    /// Applies a batch of entries, returning the number of entries whose
    /// value actually changed.
    ///
    /// Entries whose value is already present unchanged are not counted, so
    /// applying the same batch twice reports zero on the second application.
    pub fn apply(&self, entries: &[ConfigEntry]) -> usize {
        self.apply_with_changes(entries).len()
    }

    /// Applies a batch of entries and reports the old and new value for each
    /// entry that changed.
    ///
    /// The whole batch is applied under a single write lock.
    pub fn apply_with_changes(&self, entries: &[ConfigEntry]) -> Vec<AppliedChange> {
        let mut sections = self.sections.write();
        let mut changes = Vec::new();

        for entry in entries {
            let keys = sections.entry(entry.section.clone()).or_default();
            let old_value = keys.get(&entry.key).cloned();
            if old_value.as_deref() == Some(entry.value.as_str()) {
                continue;
            }
            keys.insert(entry.key.clone(), entry.value.clone());
            changes.push(AppliedChange {
                section: entry.section.clone(),
                key: entry.key.clone(),
                old_value,
                new_value: entry.value.clone(),
            });
        }

        changes
    }

    /// Replaces the entire contents of the store.
    ///
    /// Used when the on-disk configuration is reloaded.
    pub fn replace(&self, sections: BTreeMap<String, BTreeMap<String, String>>) {
        *self.sections.write() = sections;
    }

    /// Returns the section names, sorted.
    pub fn sections(&self) -> Vec<String> {
        self.sections.read().keys().cloned().collect()
    }

    /// Returns the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.read().len()
    }

    /// Returns the total number of keys across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.read().values().map(BTreeMap::len).sum()
    }

    /// Returns the number of keys in one section, or zero if it is absent.
    pub fn section_len(&self, section: &str) -> usize {
        self.sections
            .read()
            .get(section)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}
