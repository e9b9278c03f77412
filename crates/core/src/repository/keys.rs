use std::collections::BTreeMap;

use tracing::warn;

use super::CollectionKind;
use crate::config::CollisionPolicy;

/// Outcome of picking a key for a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct KeySlot {
    /// Key the entry will be stored under.
    pub key: String,
    /// The requested key was taken and a suffix was applied.
    pub renamed: bool,
}

/// Choose the key for `base` in `map`, appending `suffix` on collision.
pub(super) fn free_key<V>(
    map: &BTreeMap<String, V>,
    kind: CollectionKind,
    base: &str,
    suffix: &str,
    policy: CollisionPolicy,
) -> KeySlot {
    if !map.contains_key(base) {
        return KeySlot {
            key: base.to_string(),
            renamed: false,
        };
    }

    let mut key = format!("{base}{suffix}");
    if policy == CollisionPolicy::Repeat {
        while map.contains_key(&key) {
            key.push_str(suffix);
        }
    }
    if map.contains_key(&key) {
        warn!(collection = %kind, key = %key, "suffixed key already taken, replacing entry");
    }
    KeySlot { key, renamed: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(keys: &[&str]) -> BTreeMap<String, ()> {
        keys.iter().map(|key| (key.to_string(), ())).collect()
    }

    #[test]
    fn free_base_key_is_used_as_is() {
        let map = taken(&["7"]);
        let slot = free_key(&map, CollectionKind::Trains, "42", ".1", CollisionPolicy::Repeat);
        assert_eq!(slot.key, "42");
        assert!(!slot.renamed);
    }

    #[test]
    fn repeat_appends_until_unique() {
        let map = taken(&["42", "42.1", "42.1.1"]);
        let slot = free_key(&map, CollectionKind::Trains, "42", ".1", CollisionPolicy::Repeat);
        assert_eq!(slot.key, "42.1.1.1");
        assert!(slot.renamed);
        assert!(!map.contains_key(&slot.key));
    }

    #[test]
    fn once_appends_a_single_suffix() {
        let map = taken(&["7", "71"]);
        let slot = free_key(&map, CollectionKind::TrainBrigades, "7", "1", CollisionPolicy::Once);
        assert_eq!(slot.key, "71");
        assert!(map.contains_key(&slot.key));
    }
}
