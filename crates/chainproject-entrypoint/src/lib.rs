//! chainproject-entrypoint — projections for the ERC-4337 EntryPoint contract.
//!
//! Every EntryPoint event is mapped one-to-one onto an `EntryPoint_<Event>`
//! entity whose id is `${transactionHash}_${logIndex}` and whose attributes
//! are the event params.
//!
//! ```rust
//! use chainproject_core::{MockHarness, MockOverrides};
//!
//! let harness = MockHarness::new(chainproject_entrypoint::build_registry().unwrap());
//! let db = harness.create_mock_db();
//! let event = harness
//!     .create_mock_event("EntryPoint", "AccountDeployed", MockOverrides::new())
//!     .unwrap();
//! let db = harness.process_event(&event, &db).unwrap();
//! assert!(db.get("EntryPoint_AccountDeployed", event.entity_id().as_str()).is_some());
//! ```

use chainproject_core::{ProjectionError, ProjectionRegistry};

pub mod projections;
pub mod schemas;

/// Contract name every EntryPoint envelope is tagged with.
pub const CONTRACT: &str = "EntryPoint";

/// Entity type names written by the EntryPoint projections.
pub mod entities {
    pub const ACCOUNT_DEPLOYED: &str = "EntryPoint_AccountDeployed";
    pub const BEFORE_EXECUTION: &str = "EntryPoint_BeforeExecution";
    pub const DEPOSITED: &str = "EntryPoint_Deposited";
    pub const SIGNATURE_AGGREGATOR_CHANGED: &str = "EntryPoint_SignatureAggregatorChanged";
    pub const STAKE_LOCKED: &str = "EntryPoint_StakeLocked";
    pub const STAKE_UNLOCKED: &str = "EntryPoint_StakeUnlocked";
    pub const STAKE_WITHDRAWN: &str = "EntryPoint_StakeWithdrawn";
    pub const USER_OPERATION_EVENT: &str = "EntryPoint_UserOperationEvent";
    pub const USER_OPERATION_REVERT_REASON: &str = "EntryPoint_UserOperationRevertReason";
    pub const WITHDRAWN: &str = "EntryPoint_Withdrawn";
}

/// Register all EntryPoint projections into `registry`.
///
/// Fails with `DuplicateRegistration` if any EntryPoint event is already
/// bound.
pub fn register(registry: &mut ProjectionRegistry) -> Result<(), ProjectionError> {
    registry.register(schemas::account_deployed(), projections::account_deployed)?;
    registry.register(schemas::before_execution(), projections::before_execution)?;
    registry.register(schemas::deposited(), projections::deposited)?;
    registry.register(
        schemas::signature_aggregator_changed(),
        projections::signature_aggregator_changed,
    )?;
    registry.register(schemas::stake_locked(), projections::stake_locked)?;
    registry.register(schemas::stake_unlocked(), projections::stake_unlocked)?;
    registry.register(schemas::stake_withdrawn(), projections::stake_withdrawn)?;
    registry.register(schemas::user_operation_event(), projections::user_operation_event)?;
    registry.register(
        schemas::user_operation_revert_reason(),
        projections::user_operation_revert_reason,
    )?;
    registry.register(schemas::withdrawn(), projections::withdrawn)?;
    Ok(())
}

/// A fresh registry holding only the EntryPoint projections.
pub fn build_registry() -> Result<ProjectionRegistry, ProjectionError> {
    let mut registry = ProjectionRegistry::new();
    register(&mut registry)?;
    tracing::info!(
        contract = CONTRACT,
        projections = registry.len(),
        "built EntryPoint projection registry"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_ten_events() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 10);
        assert!(registry.triggers().iter().all(|(c, _)| c == CONTRACT));
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = build_registry().unwrap();
        let err = register(&mut registry).unwrap_err();
        assert!(matches!(err, ProjectionError::DuplicateRegistration { .. }));
    }
}
