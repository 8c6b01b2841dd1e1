//! Entry types produced while serializing and applying configuration.

/// A single `(section, key, value)` configuration triple.
///
/// Entries are transient: they exist while a snapshot is being encoded or a
/// received frame is being decoded, and are not stored as such.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigEntry {
    /// Section name.
    pub section: String,
    /// Key within the section.
    pub key: String,
    /// Value.
    pub value: String,
}

impl ConfigEntry {
    /// Creates a new entry.
    pub fn new(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Report for one entry whose value actually changed during an apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    /// Section name.
    pub section: String,
    /// Key within the section.
    pub key: String,
    /// Previous value, if the key existed before.
    pub old_value: Option<String>,
    /// New value.
    pub new_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ordering_is_section_then_key() {
        let a = ConfigEntry::new("A", "Z", "1");
        let b = ConfigEntry::new("B", "A", "2");
        let c = ConfigEntry::new("A", "A", "3");

        let mut entries = vec![a.clone(), b.clone(), c.clone()];
        entries.sort();
        assert_eq!(entries, vec![c, a, b]);
    }
}
