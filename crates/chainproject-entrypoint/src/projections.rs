//! One projection per EntryPoint event.
//!
//! Each writes a single whole record keyed by the event's entity id and
//! copies the event params verbatim.

use alloy_primitives::Bytes;
use chainproject_core::{Entity, EntityStore, EntityWrite, EventEnvelope, ProjectionError};

use crate::entities;

type Writes = Result<Vec<EntityWrite>, ProjectionError>;

pub fn account_deployed(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("userOpHash", e.hash_param("userOpHash")?)
        .with("sender", e.address_param("sender")?)
        .with("factory", e.address_param("factory")?)
        .with("paymaster", e.address_param("paymaster")?);
    Ok(vec![EntityWrite::set(entities::ACCOUNT_DEPLOYED, entity)])
}

pub fn before_execution(e: &EventEnvelope, _: &EntityStore) -> Writes {
    Ok(vec![EntityWrite::set(
        entities::BEFORE_EXECUTION,
        Entity::for_event(e),
    )])
}

pub fn deposited(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("account", e.address_param("account")?)
        .with("totalDeposit", e.uint_param("totalDeposit")?);
    Ok(vec![EntityWrite::set(entities::DEPOSITED, entity)])
}

pub fn signature_aggregator_changed(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e).with("aggregator", e.address_param("aggregator")?);
    Ok(vec![EntityWrite::set(
        entities::SIGNATURE_AGGREGATOR_CHANGED,
        entity,
    )])
}

pub fn stake_locked(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("account", e.address_param("account")?)
        .with("totalStaked", e.uint_param("totalStaked")?)
        .with("unstakeDelaySec", e.uint_param("unstakeDelaySec")?);
    Ok(vec![EntityWrite::set(entities::STAKE_LOCKED, entity)])
}

pub fn stake_unlocked(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("account", e.address_param("account")?)
        .with("withdrawTime", e.uint_param("withdrawTime")?);
    Ok(vec![EntityWrite::set(entities::STAKE_UNLOCKED, entity)])
}

pub fn stake_withdrawn(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("account", e.address_param("account")?)
        .with("withdrawAddress", e.address_param("withdrawAddress")?)
        .with("amount", e.uint_param("amount")?);
    Ok(vec![EntityWrite::set(entities::STAKE_WITHDRAWN, entity)])
}

pub fn user_operation_event(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("userOpHash", e.hash_param("userOpHash")?)
        .with("sender", e.address_param("sender")?)
        .with("paymaster", e.address_param("paymaster")?)
        .with("nonce", e.uint_param("nonce")?)
        .with("success", e.bool_param("success")?)
        .with("actualGasCost", e.uint_param("actualGasCost")?)
        .with("actualGasUsed", e.uint_param("actualGasUsed")?);
    Ok(vec![EntityWrite::set(entities::USER_OPERATION_EVENT, entity)])
}

pub fn user_operation_revert_reason(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("userOpHash", e.hash_param("userOpHash")?)
        .with("sender", e.address_param("sender")?)
        .with("nonce", e.uint_param("nonce")?)
        .with(
            "revertReason",
            Bytes::copy_from_slice(e.bytes_param("revertReason")?),
        );
    Ok(vec![EntityWrite::set(
        entities::USER_OPERATION_REVERT_REASON,
        entity,
    )])
}

pub fn withdrawn(e: &EventEnvelope, _: &EntityStore) -> Writes {
    let entity = Entity::for_event(e)
        .with("account", e.address_param("account")?)
        .with("withdrawAddress", e.address_param("withdrawAddress")?)
        .with("amount", e.uint_param("amount")?);
    Ok(vec![EntityWrite::set(entities::WITHDRAWN, entity)])
}
