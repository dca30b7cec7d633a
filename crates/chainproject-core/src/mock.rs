//! Mock harness for testing projections without a chain or a database.
//!
//! ```text
//! MockHarness::create_mock_db()           → MockDb (empty snapshot)
//! MockHarness::create_mock_event(c, e, o) → EventEnvelope (defaults + overrides)
//! MockHarness::process_event(&event, &db) → MockDb (next snapshot)
//! ```
//!
//! Every attribute that is not overridden comes from [`MockDefaults`]. The
//! table holds no counters, so two calls with the same overrides always
//! produce identical envelopes; tests that need distinct entity ids must
//! override `transaction_hash` or `log_index` themselves.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::engine::ProjectionEngine;
use crate::entity::Entity;
use crate::envelope::EventEnvelope;
use crate::error::ProjectionError;
use crate::registry::ProjectionRegistry;
use crate::store::EntityStore;
use crate::value::{ParamType, Value};

// ─── Default table ────────────────────────────────────────────────────────────

/// Type-driven placeholder values used to fill a mock event.
///
/// | field | default |
/// |---|---|
/// | `address` | zero address |
/// | `uint` / `int` | `0` |
/// | `bool` | `false` |
/// | `string` | `""` |
/// | `hash` | zero hash |
/// | `bytes` | empty |
/// | `transaction_hash` | zero hash (`0x00…00`) |
/// | `log_index`, `block_number`, `block_timestamp`, `chain_id` | `0` |
/// | `block_hash` | zero hash |
/// | `src_address` | zero address |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockDefaults {
    pub address: Address,
    pub uint: U256,
    pub int: I256,
    pub bool: bool,
    pub string: String,
    pub hash: B256,
    pub bytes: Bytes,
    pub transaction_hash: String,
    pub log_index: u32,
    pub block_number: u64,
    pub block_timestamp: i64,
    pub block_hash: B256,
    pub src_address: Address,
    pub chain_id: u64,
}

impl Default for MockDefaults {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            uint: U256::ZERO,
            int: I256::ZERO,
            bool: false,
            string: String::new(),
            hash: B256::ZERO,
            bytes: Bytes::new(),
            transaction_hash: B256::ZERO.to_string(),
            log_index: 0,
            block_number: 0,
            block_timestamp: 0,
            block_hash: B256::ZERO,
            src_address: Address::ZERO,
            chain_id: 0,
        }
    }
}

impl MockDefaults {
    /// Placeholder for a parameter of type `ty`.
    pub fn value_for(&self, ty: ParamType) -> Value {
        match ty {
            ParamType::Address => Value::Address(self.address),
            ParamType::Uint(_) => Value::Uint(self.uint),
            ParamType::Int(_) => Value::Int(self.int),
            ParamType::Bool => Value::Bool(self.bool),
            ParamType::Str => Value::Str(self.string.clone()),
            ParamType::Hash => Value::Hash(self.hash),
            ParamType::Bytes => Value::Bytes(self.bytes.clone()),
        }
    }
}

/// Number of addresses returned by [`mock_addresses`].
pub const MOCK_ADDRESS_COUNT: usize = 20;

/// Distinct non-zero addresses for tests that need several actors:
/// `0x0101…01`, `0x0202…02`, and so on.
pub fn mock_addresses() -> [Address; MOCK_ADDRESS_COUNT] {
    std::array::from_fn(|i| Address::repeat_byte(i as u8 + 1))
}

/// The first of [`mock_addresses`].
pub fn default_mock_address() -> Address {
    Address::repeat_byte(1)
}

// ─── Overrides ────────────────────────────────────────────────────────────────

/// Fields a test wants to pin on a mock event. Anything left `None` (or
/// absent from `params`) is taken from [`MockDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MockOverrides {
    pub params: BTreeMap<String, Value>,
    pub transaction_hash: Option<String>,
    pub log_index: Option<u32>,
    pub block_number: Option<u64>,
    pub block_timestamp: Option<i64>,
    pub block_hash: Option<B256>,
    pub src_address: Option<Address>,
    pub chain_id: Option<u64>,
}

impl MockOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    pub fn log_index(mut self, log_index: u32) -> Self {
        self.log_index = Some(log_index);
        self
    }

    pub fn block_number(mut self, number: u64) -> Self {
        self.block_number = Some(number);
        self
    }

    pub fn block_timestamp(mut self, timestamp: i64) -> Self {
        self.block_timestamp = Some(timestamp);
        self
    }

    pub fn block_hash(mut self, hash: B256) -> Self {
        self.block_hash = Some(hash);
        self
    }

    pub fn src_address(mut self, address: Address) -> Self {
        self.src_address = Some(address);
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

// ─── MockDb ───────────────────────────────────────────────────────────────────

/// An in-memory entity database for tests. Cloning is cheap and every
/// mutation returns a new `MockDb`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MockDb {
    store: EntityStore,
}

impl MockDb {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing snapshot.
    pub fn from_store(store: EntityStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn into_store(self) -> EntityStore {
        self.store
    }

    /// Point lookup of `entity_type/id`.
    pub fn get(&self, entity_type: &str, id: &str) -> Option<&Entity> {
        self.store.get(entity_type, id)
    }

    /// All entities of one type, ordered by id.
    pub fn entities<'a>(&'a self, entity_type: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.store.entities(entity_type)
    }

    /// Seed an entity, returning the new database.
    pub fn with_entity(&self, entity_type: &str, entity: Entity) -> MockDb {
        Self::from_store(self.store.set(entity_type, entity))
    }
}

// ─── MockHarness ──────────────────────────────────────────────────────────────

/// Drives one registry through mock events.
#[derive(Debug, Clone)]
pub struct MockHarness {
    engine: ProjectionEngine,
    defaults: MockDefaults,
}

impl MockHarness {
    /// Harness over `registry` with zero-valued defaults.
    pub fn new(registry: ProjectionRegistry) -> Self {
        Self::with_defaults(registry, MockDefaults::default())
    }

    pub fn with_defaults(registry: ProjectionRegistry, defaults: MockDefaults) -> Self {
        Self {
            engine: ProjectionEngine::with_config(registry, EngineConfig::default()),
            defaults,
        }
    }

    /// Harness over an already-configured engine.
    pub fn from_engine(engine: ProjectionEngine) -> Self {
        Self {
            engine,
            defaults: MockDefaults::default(),
        }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn defaults(&self) -> &MockDefaults {
        &self.defaults
    }

    /// An empty mock database.
    pub fn create_mock_db(&self) -> MockDb {
        MockDb::new()
    }

    /// Build an envelope for `contract.event`, filling every schema param
    /// and metadata field that `overrides` leaves unset from the default
    /// table.
    ///
    /// Fails with `UnhandledEvent` if the pair is not registered, and with
    /// `MalformedEnvelope` if an override names an undeclared param or has
    /// the wrong type.
    pub fn create_mock_event(
        &self,
        contract: &str,
        event: &str,
        overrides: MockOverrides,
    ) -> Result<EventEnvelope, ProjectionError> {
        let schema = self.engine.registry().schema(contract, event).ok_or_else(|| {
            ProjectionError::UnhandledEvent {
                contract: contract.to_string(),
                event: event.to_string(),
            }
        })?;

        let d = &self.defaults;
        let mut params = overrides.params;
        for def in &schema.params {
            params
                .entry(def.name.clone())
                .or_insert_with(|| d.value_for(def.ty));
        }
        schema.validate(&params)?;

        let mut builder = EventEnvelope::builder(contract, event)
            .transaction_hash(
                overrides
                    .transaction_hash
                    .unwrap_or_else(|| d.transaction_hash.clone()),
            )
            .log_index(overrides.log_index.unwrap_or(d.log_index))
            .block_number(overrides.block_number.unwrap_or(d.block_number))
            .block_timestamp(overrides.block_timestamp.unwrap_or(d.block_timestamp))
            .block_hash(overrides.block_hash.unwrap_or(d.block_hash))
            .src_address(overrides.src_address.unwrap_or(d.src_address))
            .chain_id(overrides.chain_id.unwrap_or(d.chain_id));
        for (name, value) in params {
            builder = builder.param(name, value);
        }
        Ok(builder.build())
    }

    /// Run `event` through the engine against `db`, returning the next
    /// database. `db` itself is never modified.
    pub fn process_event(&self, event: &EventEnvelope, db: &MockDb) -> Result<MockDb, ProjectionError> {
        self.engine.apply(event, &db.store).map(MockDb::from_store)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
