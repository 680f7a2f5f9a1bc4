//! The part dictionary: one abstract part per filename, plus every placed
//! part instance.

use std::collections::HashMap;

use crate::arena::{AbstractPartId, Arena, PartInstanceId};
use crate::part::{AbstractPart, Part};

/// Owner of all abstract parts and part instances of one document (or of
/// one template).
#[derive(Debug, Clone, Default)]
pub struct PartStore {
    parts: Arena<AbstractPart, AbstractPartId>,
    index: HashMap<String, AbstractPartId>,
    instances: Arena<Part, PartInstanceId>,
}

impl PartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dictionary entry.
    ///
    /// A second entry with the same filename replaces the first in place
    /// and keeps its id, so the dictionary never holds two parts for one
    /// filename. Returns the id and whether an entry was replaced.
    pub fn insert(&mut self, part: AbstractPart) -> (AbstractPartId, bool) {
        if let Some(&id) = self.index.get(&part.filename)
            && let Some(slot) = self.parts.get_mut(id)
        {
            *slot = part;
            return (id, true);
        }
        let filename = part.filename.clone();
        let id = self.parts.push(part);
        self.index.insert(filename, id);
        (id, false)
    }

    /// Store an abstract part that is not a dictionary entry (the main model).
    pub fn insert_unindexed(&mut self, part: AbstractPart) -> AbstractPartId {
        self.parts.push(part)
    }

    #[must_use]
    pub fn lookup(&self, filename: &str) -> Option<AbstractPartId> {
        self.index.get(filename).copied()
    }

    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.index.contains_key(filename)
    }

    #[must_use]
    pub fn get(&self, id: AbstractPartId) -> Option<&AbstractPart> {
        self.parts.get(id)
    }

    pub fn get_mut(&mut self, id: AbstractPartId) -> Option<&mut AbstractPart> {
        self.parts.get_mut(id)
    }

    /// Look up an abstract part by filename.
    #[must_use]
    pub fn by_name(&self, filename: &str) -> Option<&AbstractPart> {
        self.lookup(filename).and_then(|id| self.parts.get(id))
    }

    /// Dictionary entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (AbstractPartId, &AbstractPart)> {
        self.parts
            .iter()
            .filter(|(id, part)| self.index.get(&part.filename) == Some(id))
    }

    /// Dictionary entries that are plain parts, in insertion order.
    pub fn plain_parts(&self) -> impl Iterator<Item = (AbstractPartId, &AbstractPart)> {
        self.entries().filter(|(_, p)| !p.is_submodel())
    }

    /// Dictionary entries that are submodels, in insertion order.
    pub fn submodels(&self) -> impl Iterator<Item = (AbstractPartId, &AbstractPart)> {
        self.entries().filter(|(_, p)| p.is_submodel())
    }

    /// Number of dictionary entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn add_instance(&mut self, part: Part) -> PartInstanceId {
        self.instances.push(part)
    }

    #[must_use]
    pub fn instance(&self, id: PartInstanceId) -> Option<&Part> {
        self.instances.get(id)
    }

    pub fn instance_mut(&mut self, id: PartInstanceId) -> Option<&mut Part> {
        self.instances.get_mut(id)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instances(&self) -> impl Iterator<Item = (PartInstanceId, &Part)> {
        self.instances.iter()
    }

    /// All abstract parts, including the unindexed main model.
    pub fn abstract_parts(&self) -> impl Iterator<Item = (AbstractPartId, &AbstractPart)> {
        self.parts.iter()
    }

    /// Borrow the abstract parts and the instances separately.
    pub fn split_mut(
        &mut self,
    ) -> (
        &mut Arena<AbstractPart, AbstractPartId>,
        &mut Arena<Part, PartInstanceId>,
    ) {
        (&mut self.parts, &mut self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IDENTITY_MATRIX;

    #[test]
    fn test_insert_and_lookup() {
        let mut store = PartStore::new();
        let (id, replaced) = store.insert(AbstractPart::new("3001.dat", "Brick 2 x 4"));
        assert!(!replaced);
        assert_eq!(store.lookup("3001.dat"), Some(id));
        assert_eq!(store.by_name("3001.dat").map(|p| p.name.as_str()), Some("Brick 2 x 4"));
        assert!(store.lookup("3002.dat").is_none());
    }

    #[test]
    fn test_duplicate_filename_replaces_in_place() {
        let mut store = PartStore::new();
        let (first, _) = store.insert(AbstractPart::new("3001.dat", "old"));
        let (second, replaced) = store.insert(AbstractPart::new("3001.dat", "new"));
        assert!(replaced);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries().count(), 1);
        assert_eq!(store.by_name("3001.dat").map(|p| p.name.as_str()), Some("new"));
    }

    #[test]
    fn test_parts_and_submodels_are_partitioned() {
        let mut store = PartStore::new();
        store.insert(AbstractPart::new_submodel("wing.ldr", "Wing"));
        store.insert(AbstractPart::new("3001.dat", "Brick"));
        store.insert_unindexed(AbstractPart::new_submodel("main.ldr", "Main"));

        let plain: Vec<_> = store.plain_parts().map(|(_, p)| p.filename.as_str()).collect();
        let subs: Vec<_> = store.submodels().map(|(_, p)| p.filename.as_str()).collect();
        assert_eq!(plain, vec!["3001.dat"]);
        assert_eq!(subs, vec!["wing.ldr"]);
        assert_eq!(store.abstract_parts().count(), 3);
    }

    #[test]
    fn test_instances() {
        let mut store = PartStore::new();
        let id = store.add_instance(Part::new("3001.dat", None, IDENTITY_MATRIX));
        assert_eq!(store.instance(id).map(|p| p.filename.as_str()), Some("3001.dat"));
        assert_eq!(store.instance_count(), 1);
    }
}
