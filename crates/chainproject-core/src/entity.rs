//! Entity records and the writes a projection emits.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::envelope::EventEnvelope;
use crate::value::Value;

/// Primary key of an entity: `${transactionHash}_${logIndex}` of the event
/// that produced it.
///
/// There is no public constructor taking an arbitrary string. An id is
/// obtained from an envelope or from an entity already in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Derive the id for every entity written while handling `event`.
    pub fn for_event(event: &EventEnvelope) -> Self {
        Self(format!("{}_{}", event.transaction_hash(), event.log_index()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A whole entity record: id plus its full attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    id: EntityId,
    fields: BTreeMap<String, Value>,
}

impl Entity {
    /// An entity keyed by `event`, with no attributes yet.
    pub fn for_event(event: &EventEnvelope) -> Self {
        Self {
            id: EntityId::for_event(event),
            fields: BTreeMap::new(),
        }
    }

    /// Add an attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

/// One store mutation emitted by a projection.
///
/// Writes always carry the full record; there are no field-level patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EntityWrite {
    /// Insert or replace the entity.
    Set { entity_type: String, entity: Entity },
    /// Remove the entity if present.
    Delete { entity_type: String, id: EntityId },
}

impl EntityWrite {
    pub fn set(entity_type: impl Into<String>, entity: Entity) -> Self {
        Self::Set {
            entity_type: entity_type.into(),
            entity,
        }
    }

    pub fn delete(entity_type: impl Into<String>, id: EntityId) -> Self {
        Self::Delete {
            entity_type: entity_type.into(),
            id,
        }
    }

    pub fn entity_type(&self) -> &str {
        match self {
            Self::Set { entity_type, .. } | Self::Delete { entity_type, .. } => entity_type,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Self::Set { entity, .. } => entity.id(),
            Self::Delete { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn entity_keyed_by_event() {
        let event = EventEnvelope::builder("EntryPoint", "SignatureAggregatorChanged")
            .param("aggregator", Address::ZERO)
            .transaction_hash("0xfeed")
            .log_index(12)
            .build();
        let entity = Entity::for_event(&event).with("aggregator", Address::ZERO);
        assert_eq!(entity.id().as_str(), "0xfeed_12");
        assert_eq!(entity.get("aggregator"), Some(&Value::Address(Address::ZERO)));
        assert!(entity.get("missing").is_none());
    }

    #[test]
    fn write_serializes_with_op_tag() {
        let event = EventEnvelope::builder("EntryPoint", "BeforeExecution")
            .transaction_hash("0x01")
            .build();
        let write = EntityWrite::delete("EntryPoint_BeforeExecution", event.entity_id());
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(json["op"], "delete");
        assert_eq!(json["id"], "0x01_0");
    }
}
