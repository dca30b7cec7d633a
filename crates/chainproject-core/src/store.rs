//! Entity store snapshots.
//!
//! An [`EntityStore`] is an immutable value. `set` and `delete` return a new
//! snapshot and leave the receiver untouched. Tables are reference-counted,
//! so a write copies only the one table it touches; every other table is
//! shared with the previous snapshot.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entity::{Entity, EntityWrite};

type Table = BTreeMap<String, Arc<Entity>>;

/// One generation of the entity store.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    tables: Arc<BTreeMap<String, Arc<Table>>>,
    generation: u64,
}

impl EntityStore {
    /// An empty store at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point lookup. `None` means absent; no default entity is ever returned.
    pub fn get(&self, entity_type: &str, id: &str) -> Option<&Entity> {
        self.tables.get(entity_type)?.get(id).map(Arc::as_ref)
    }

    /// Return a snapshot with `entity` inserted (or replaced).
    pub fn set(&self, entity_type: &str, entity: Entity) -> EntityStore {
        let mut next = self.clone();
        let tables = Arc::make_mut(&mut next.tables);
        let table = Arc::make_mut(tables.entry(entity_type.to_string()).or_default());
        table.insert(entity.id().as_str().to_string(), Arc::new(entity));
        next.generation += 1;
        next
    }

    /// Return a snapshot without `entity_type/id`.
    ///
    /// Deleting an absent entity still yields a new generation with the same
    /// contents.
    pub fn delete(&self, entity_type: &str, id: &str) -> EntityStore {
        let mut next = self.clone();
        if self.get(entity_type, id).is_some() {
            let tables = Arc::make_mut(&mut next.tables);
            if let Some(table) = tables.get_mut(entity_type) {
                Arc::make_mut(table).remove(id);
                if table.is_empty() {
                    tables.remove(entity_type);
                }
            }
        }
        next.generation += 1;
        next
    }

    /// Apply a single projection write.
    pub fn apply_write(&self, write: &EntityWrite) -> EntityStore {
        match write {
            EntityWrite::Set {
                entity_type,
                entity,
            } => self.set(entity_type, entity.clone()),
            EntityWrite::Delete { entity_type, id } => self.delete(entity_type, id.as_str()),
        }
    }

    /// All entities of one type, ordered by id.
    pub fn entities<'a>(&'a self, entity_type: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.tables
            .get(entity_type)
            .into_iter()
            .flat_map(|t| t.values().map(Arc::as_ref))
    }

    /// Entity type names that currently hold at least one entity.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of entities of one type.
    pub fn count(&self, entity_type: &str) -> usize {
        self.tables.get(entity_type).map_or(0, |t| t.len())
    }

    /// Total number of entities across all types.
    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many writes produced this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if both handles refer to the very same snapshot.
    pub fn same_snapshot(&self, other: &EntityStore) -> bool {
        Arc::ptr_eq(&self.tables, &other.tables) && self.generation == other.generation
    }
}

/// Two snapshots are equal when they hold the same entities, regardless of
/// how many writes it took to get there.
impl PartialEq for EntityStore {
    fn eq(&self, other: &Self) -> bool {
        self.tables == other.tables
    }
}

impl Eq for EntityStore {}

impl Serialize for EntityStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (entity_type, table) in self.tables.iter() {
            let entities: Vec<&Entity> = table.values().map(Arc::as_ref).collect();
            map.serialize_entry(entity_type, &entities)?;
        }
        map.end()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EventEnvelope;
    use crate::value::Value;
    use alloy_primitives::U256;

    fn deposit(tx: &str, log_index: u32, amount: u64) -> Entity {
        let event = EventEnvelope::builder("EntryPoint", "Deposited")
            .transaction_hash(tx)
            .log_index(log_index)
            .build();
        Entity::for_event(&event).with("totalDeposit", U256::from(amount))
    }

    #[test]
    fn set_does_not_mutate_previous_snapshot() {
        let empty = EntityStore::new();
        let one = empty.set("Deposited", deposit("0xa", 0, 10));

        assert!(empty.get("Deposited", "0xa_0").is_none());
        assert!(empty.is_empty());
        assert_eq!(one.count("Deposited"), 1);
        assert_eq!(one.generation(), 1);
    }

    #[test]
    fn set_replaces_whole_record() {
        let s1 = EntityStore::new().set("Deposited", deposit("0xa", 0, 10));
        let s2 = s1.set("Deposited", deposit("0xa", 0, 20));

        let old = s1.get("Deposited", "0xa_0").unwrap();
        let new = s2.get("Deposited", "0xa_0").unwrap();
        assert_eq!(old.get("totalDeposit"), Some(&Value::Uint(U256::from(10u64))));
        assert_eq!(new.get("totalDeposit"), Some(&Value::Uint(U256::from(20u64))));
        assert_eq!(s2.len(), 1);
    }

    #[test]
    fn delete_returns_new_snapshot() {
        let s1 = EntityStore::new()
            .set("Deposited", deposit("0xa", 0, 10))
            .set("Deposited", deposit("0xb", 1, 11));
        let s2 = s1.delete("Deposited", "0xa_0");

        assert!(s1.get("Deposited", "0xa_0").is_some());
        assert!(s2.get("Deposited", "0xa_0").is_none());
        assert!(s2.get("Deposited", "0xb_1").is_some());
    }

    #[test]
    fn delete_last_entity_drops_table() {
        let s1 = EntityStore::new().set("Deposited", deposit("0xa", 0, 10));
        let s2 = s1.delete("Deposited", "0xa_0");
        assert_eq!(s2.entity_types().count(), 0);
        assert_eq!(s2, EntityStore::new());
    }

    #[test]
    fn delete_absent_is_noop_on_contents() {
        let s1 = EntityStore::new().set("Deposited", deposit("0xa", 0, 10));
        let s2 = s1.delete("Withdrawn", "0xa_0");
        assert_eq!(s1, s2);
        assert_eq!(s2.generation(), s1.generation() + 1);
    }

    #[test]
    fn untouched_tables_are_shared() {
        let s1 = EntityStore::new()
            .set("Deposited", deposit("0xa", 0, 10))
            .set("Withdrawn", deposit("0xb", 0, 1));
        let s2 = s1.set("Deposited", deposit("0xc", 0, 5));

        let withdrawn_before = s1.tables.get("Withdrawn").unwrap();
        let withdrawn_after = s2.tables.get("Withdrawn").unwrap();
        assert!(Arc::ptr_eq(withdrawn_before, withdrawn_after));
    }

    #[test]
    fn entities_iterates_in_id_order() {
        let s = EntityStore::new()
            .set("Deposited", deposit("0xb", 0, 2))
            .set("Deposited", deposit("0xa", 0, 1));
        let ids: Vec<&str> = s.entities("Deposited").map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["0xa_0", "0xb_0"]);
        assert_eq!(s.entities("Unknown").count(), 0);
    }

    #[test]
    fn same_snapshot_is_identity() {
        let s1 = EntityStore::new().set("Deposited", deposit("0xa", 0, 10));
        let alias = s1.clone();
        let s2 = s1.set("Deposited", deposit("0xa", 0, 10));
        assert!(s1.same_snapshot(&alias));
        assert!(!s1.same_snapshot(&s2));
        assert_eq!(s1, s2);
    }
}
