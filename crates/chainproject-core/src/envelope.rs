//! Event envelopes — the normalized form of one decoded log.
//!
//! An envelope is created once per event occurrence and never mutated:
//! fields are private and only exposed through read accessors. The decode
//! layer builds envelopes with [`EnvelopeBuilder`]; tests usually go through
//! [`MockHarness::create_mock_event`](crate::mock::MockHarness::create_mock_event).

use alloy_primitives::{Address, B256, I256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::EntityId;
use crate::error::ProjectionError;
use crate::value::Value;

/// A decoded contract event plus the chain metadata it was emitted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    contract: String,
    event: String,
    params: BTreeMap<String, Value>,
    transaction_hash: String,
    log_index: u32,
    block_number: u64,
    block_timestamp: i64,
    block_hash: B256,
    src_address: Address,
    chain_id: u64,
}

impl EventEnvelope {
    /// Start building an envelope for `contract.event`.
    pub fn builder(contract: impl Into<String>, event: impl Into<String>) -> EnvelopeBuilder {
        EnvelopeBuilder::new(contract, event)
    }

    /// Contract name the event was decoded against (e.g. `"EntryPoint"`).
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Event name (e.g. `"AccountDeployed"`).
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Transaction hash (`0x…`).
    pub fn transaction_hash(&self) -> &str {
        &self.transaction_hash
    }

    /// Log index within the block.
    pub fn log_index(&self) -> u32 {
        self.log_index
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Unix timestamp of the block (seconds since epoch).
    pub fn block_timestamp(&self) -> i64 {
        self.block_timestamp
    }

    pub fn block_hash(&self) -> B256 {
        self.block_hash
    }

    /// Address of the contract instance that emitted the log.
    pub fn src_address(&self) -> Address {
        self.src_address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Canonical ordering key: block number, then log index.
    pub fn position(&self) -> (u64, u32) {
        (self.block_number, self.log_index)
    }

    /// Block timestamp as a UTC datetime, if it is in range.
    pub fn block_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.block_timestamp, 0)
    }

    /// Identifier of every entity written for this event:
    /// `${transactionHash}_${logIndex}`.
    pub fn entity_id(&self) -> EntityId {
        EntityId::for_event(self)
    }

    /// Look up a parameter, failing with `MalformedEnvelope` if absent.
    pub fn param(&self, name: &str) -> Result<&Value, ProjectionError> {
        self.params
            .get(name)
            .ok_or_else(|| self.malformed(format!("missing param '{name}'")))
    }

    pub fn address_param(&self, name: &str) -> Result<Address, ProjectionError> {
        let v = self.param(name)?;
        v.as_address().ok_or_else(|| self.mistyped(name, "address", v))
    }

    pub fn uint_param(&self, name: &str) -> Result<U256, ProjectionError> {
        let v = self.param(name)?;
        v.as_uint().ok_or_else(|| self.mistyped(name, "uint", v))
    }

    pub fn int_param(&self, name: &str) -> Result<I256, ProjectionError> {
        let v = self.param(name)?;
        v.as_int().ok_or_else(|| self.mistyped(name, "int", v))
    }

    pub fn bool_param(&self, name: &str) -> Result<bool, ProjectionError> {
        let v = self.param(name)?;
        v.as_bool().ok_or_else(|| self.mistyped(name, "bool", v))
    }

    pub fn str_param(&self, name: &str) -> Result<&str, ProjectionError> {
        let v = self.param(name)?;
        v.as_str().ok_or_else(|| self.mistyped(name, "string", v))
    }

    pub fn hash_param(&self, name: &str) -> Result<B256, ProjectionError> {
        let v = self.param(name)?;
        v.as_hash().ok_or_else(|| self.mistyped(name, "bytes32", v))
    }

    pub fn bytes_param(&self, name: &str) -> Result<&[u8], ProjectionError> {
        let v = self.param(name)?;
        v.as_bytes().ok_or_else(|| self.mistyped(name, "bytes", v))
    }

    fn mistyped(&self, name: &str, expected: &str, got: &Value) -> ProjectionError {
        self.malformed(format!(
            "param '{name}' expected {expected}, got {}",
            got.kind()
        ))
    }

    fn malformed(&self, reason: String) -> ProjectionError {
        ProjectionError::malformed(&self.contract, &self.event, reason)
    }
}

// ─── EnvelopeBuilder ──────────────────────────────────────────────────────────

/// Builder for [`EventEnvelope`].
///
/// Metadata not set explicitly stays at its zero value: zero hashes, zero
/// address, block 0, log index 0, chain id 0.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    inner: EventEnvelope,
}

impl EnvelopeBuilder {
    pub fn new(contract: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            inner: EventEnvelope {
                contract: contract.into(),
                event: event.into(),
                params: BTreeMap::new(),
                transaction_hash: B256::ZERO.to_string(),
                log_index: 0,
                block_number: 0,
                block_timestamp: 0,
                block_hash: B256::ZERO,
                src_address: Address::ZERO,
                chain_id: 0,
            },
        }
    }

    /// Set (or replace) a decoded parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner.params.insert(name.into(), value.into());
        self
    }

    pub fn transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.inner.transaction_hash = hash.into();
        self
    }

    pub fn log_index(mut self, log_index: u32) -> Self {
        self.inner.log_index = log_index;
        self
    }

    pub fn block_number(mut self, number: u64) -> Self {
        self.inner.block_number = number;
        self
    }

    pub fn block_timestamp(mut self, timestamp: i64) -> Self {
        self.inner.block_timestamp = timestamp;
        self
    }

    pub fn block_hash(mut self, hash: B256) -> Self {
        self.inner.block_hash = hash;
        self
    }

    pub fn src_address(mut self, address: Address) -> Self {
        self.inner.src_address = address;
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.inner.chain_id = chain_id;
        self
    }

    pub fn build(self) -> EventEnvelope {
        self.inner
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn deposited() -> EventEnvelope {
        EventEnvelope::builder("EntryPoint", "Deposited")
            .param("account", Address::repeat_byte(0x11))
            .param("totalDeposit", U256::from(1_000u64))
            .transaction_hash("0xabc")
            .log_index(3)
            .block_number(19_000_000)
            .block_timestamp(1_700_000_000)
            .build()
    }

    #[test]
    fn entity_id_is_tx_hash_and_log_index() {
        assert_eq!(deposited().entity_id().as_str(), "0xabc_3");
    }

    #[test]
    fn builder_defaults_are_zero() {
        let e = EventEnvelope::builder("EntryPoint", "BeforeExecution").build();
        assert_eq!(e.transaction_hash(), B256::ZERO.to_string());
        assert_eq!(e.log_index(), 0);
        assert_eq!(e.src_address(), Address::ZERO);
        assert!(e.params().is_empty());
    }

    #[test]
    fn typed_param_accessors() {
        let e = deposited();
        assert_eq!(e.address_param("account").unwrap(), Address::repeat_byte(0x11));
        assert_eq!(e.uint_param("totalDeposit").unwrap(), U256::from(1_000u64));
    }

    #[test]
    fn missing_param_is_malformed() {
        let err = deposited().address_param("withdrawAddress").unwrap_err();
        assert!(matches!(err, ProjectionError::MalformedEnvelope { .. }));
    }

    #[test]
    fn mistyped_param_is_malformed() {
        let err = deposited().bool_param("totalDeposit").unwrap_err();
        assert!(err.to_string().contains("expected bool, got uint"));
    }

    #[test]
    fn position_orders_by_block_then_log() {
        let a = deposited();
        let b = EventEnvelope::builder("EntryPoint", "Deposited")
            .block_number(19_000_000)
            .log_index(4)
            .build();
        assert!(a.position() < b.position());
    }

    #[test]
    fn block_time_from_timestamp() {
        let t = deposited().block_time().unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
    }
}
