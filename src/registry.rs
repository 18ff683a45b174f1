use alloc::{collections::BTreeMap, vec::Vec};
use tracing::debug;

use crate::{errors::RegistryErrorKind, identifier::Identifier, payload::Payload};

/// Mapping from identifiers to payloads, with a LIFO stack of saved copies
#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<Identifier, Payload>,
    snapshots: Vec<BTreeMap<Identifier, Payload>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            snapshots: Vec::new(),
        }
    }

    /// Inserts an empty payload, failing if the identifier is taken
    pub(crate) fn insert_new(&mut self, identifier: &Identifier) -> Result<&mut Payload, RegistryErrorKind> {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        match self.entries.entry(identifier.clone()) {
            Occupied(_) => Err(RegistryErrorKind::AlreadyRegistered {
                identifier: identifier.clone(),
            }),
            Vacant(entry) => {
                debug!(%identifier, "Bound");
                Ok(entry.insert(Payload::new()))
            }
        }
    }

    /// Payload of the identifier, an empty one is inserted if absent
    pub(crate) fn get_or_insert_new(&mut self, identifier: &Identifier) -> &mut Payload {
        self.entries.entry(identifier.clone()).or_insert_with(|| {
            debug!(%identifier, "Bound");
            Payload::new()
        })
    }

    pub(crate) fn remove(&mut self, identifier: &Identifier) -> Result<Payload, RegistryErrorKind> {
        let payload = self.entries.remove(identifier).ok_or_else(|| RegistryErrorKind::NotRegistered {
            identifier: identifier.clone(),
        })?;
        debug!(%identifier, "Unbound");
        Ok(payload)
    }

    /// Replaces a present payload wholesale
    pub(crate) fn replace(&mut self, identifier: &Identifier, payload: Payload) -> Result<Payload, RegistryErrorKind> {
        let Some(entry) = self.entries.get_mut(identifier) else {
            return Err(RegistryErrorKind::NotRegistered {
                identifier: identifier.clone(),
            });
        };
        debug!(%identifier, "Overridden");
        Ok(core::mem::replace(entry, payload))
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, identifier: &Identifier) -> bool {
        self.entries.contains_key(identifier)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, identifier: &Identifier) -> Option<&Payload> {
        self.entries.get(identifier)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get_mut(&mut self, identifier: &Identifier) -> Option<&mut Payload> {
        self.entries.get_mut(identifier)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Saves a copy of the live entries.
    /// Payloads are copied, so later in-place edits don't leak into the snapshot.
    pub(crate) fn snapshot(&mut self) {
        self.snapshots.push(self.entries.clone());
        debug!(depth = self.snapshots.len(), "Snapshot pushed");
    }

    /// Makes the most recent snapshot live, keeps the current entries if there is none
    pub(crate) fn restore(&mut self) {
        match self.snapshots.pop() {
            Some(entries) => {
                self.entries = entries;
                debug!(depth = self.snapshots.len(), "Snapshot restored");
            }
            None => debug!("No snapshot to restore"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        debug!("Cleared");
    }

    #[inline]
    #[must_use]
    #[cfg(test)]
    pub(crate) fn snapshots_len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Registry;
    use crate::{config::Config, errors::RegistryErrorKind, identifier::Identifier, payload::Payload};

    use alloc::sync::Arc;
    use tracing_test::traced_test;
    #[allow(unused_imports)]
    use std::{format, string::{String, ToString}};

    #[test]
    #[traced_test]
    fn test_insert_new_twice() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");

        assert!(registry.insert_new(&foo).unwrap().is_empty());
        assert!(matches!(
            registry.insert_new(&foo),
            Err(RegistryErrorKind::AlreadyRegistered { identifier }) if identifier == foo
        ));

        registry.remove(&foo).unwrap();
        assert!(registry.insert_new(&foo).is_ok());
    }

    #[test]
    #[traced_test]
    fn test_get_or_insert_new() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");

        assert!(registry.get_or_insert_new(&foo).is_empty());
        registry.get_mut(&foo).unwrap().value = Some(Arc::new(1u8));
        assert!(!registry.get_or_insert_new(&foo).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_absent_operations() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");

        assert!(matches!(registry.remove(&foo), Err(RegistryErrorKind::NotRegistered { .. })));
        assert!(matches!(
            registry.replace(&foo, Payload::new()),
            Err(RegistryErrorKind::NotRegistered { .. })
        ));
        assert!(!registry.contains(&foo));
        assert!(registry.get(&foo).is_none());
    }

    #[test]
    #[traced_test]
    fn test_replace() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");
        registry.insert_new(&foo).unwrap();

        let transient = Config {
            singleton: false,
            no_cache: false,
        };
        let previous = registry.replace(&foo, Payload::with_config(transient)).unwrap();

        assert!(previous.is_singleton());
        assert!(!registry.get(&foo).unwrap().is_singleton());
    }

    #[test]
    #[traced_test]
    fn test_snapshot_restore() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");
        let bar = Identifier::from("bar");
        registry.insert_new(&foo).unwrap();

        registry.snapshot();
        registry.insert_new(&bar).unwrap();
        registry.get_mut(&foo).unwrap().value = Some(Arc::new(1u8));
        assert_eq!(registry.len(), 2);

        registry.restore();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&bar));
        assert!(registry.get(&foo).unwrap().is_empty());
        assert_eq!(registry.snapshots_len(), 0);
    }

    #[test]
    #[traced_test]
    fn test_restore_without_snapshot() {
        let mut registry = Registry::new();
        let foo = Identifier::from("foo");
        registry.insert_new(&foo).unwrap();

        registry.restore();
        assert!(registry.contains(&foo));
    }

    #[test]
    #[traced_test]
    fn test_clear_keeps_snapshots() {
        let mut registry = Registry::new();
        registry.insert_new(&Identifier::from("foo")).unwrap();
        registry.snapshot();

        registry.clear();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.snapshots_len(), 1);

        registry.restore();
        assert_eq!(registry.len(), 1);
    }
}
