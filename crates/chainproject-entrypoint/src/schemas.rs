//! EntryPoint event schemas (ERC-4337 v0.6).

use chainproject_core::{EventSchema, ParamType};

use crate::CONTRACT;

const UINT256: ParamType = ParamType::Uint(256);

/// `AccountDeployed(bytes32 indexed userOpHash, address indexed sender, address factory, address paymaster)`
pub fn account_deployed() -> EventSchema {
    EventSchema::new(CONTRACT, "AccountDeployed")
        .indexed("userOpHash", ParamType::Hash)
        .indexed("sender", ParamType::Address)
        .param("factory", ParamType::Address)
        .param("paymaster", ParamType::Address)
}

/// `BeforeExecution()`
pub fn before_execution() -> EventSchema {
    EventSchema::new(CONTRACT, "BeforeExecution")
}

/// `Deposited(address indexed account, uint256 totalDeposit)`
pub fn deposited() -> EventSchema {
    EventSchema::new(CONTRACT, "Deposited")
        .indexed("account", ParamType::Address)
        .param("totalDeposit", UINT256)
}

/// `SignatureAggregatorChanged(address indexed aggregator)`
pub fn signature_aggregator_changed() -> EventSchema {
    EventSchema::new(CONTRACT, "SignatureAggregatorChanged").indexed("aggregator", ParamType::Address)
}

/// `StakeLocked(address indexed account, uint256 totalStaked, uint256 unstakeDelaySec)`
pub fn stake_locked() -> EventSchema {
    EventSchema::new(CONTRACT, "StakeLocked")
        .indexed("account", ParamType::Address)
        .param("totalStaked", UINT256)
        .param("unstakeDelaySec", UINT256)
}

/// `StakeUnlocked(address indexed account, uint256 withdrawTime)`
pub fn stake_unlocked() -> EventSchema {
    EventSchema::new(CONTRACT, "StakeUnlocked")
        .indexed("account", ParamType::Address)
        .param("withdrawTime", UINT256)
}

/// `StakeWithdrawn(address indexed account, address withdrawAddress, uint256 amount)`
pub fn stake_withdrawn() -> EventSchema {
    EventSchema::new(CONTRACT, "StakeWithdrawn")
        .indexed("account", ParamType::Address)
        .param("withdrawAddress", ParamType::Address)
        .param("amount", UINT256)
}

/// `UserOperationEvent(bytes32 indexed userOpHash, address indexed sender, address indexed paymaster,
/// uint256 nonce, bool success, uint256 actualGasCost, uint256 actualGasUsed)`
pub fn user_operation_event() -> EventSchema {
    EventSchema::new(CONTRACT, "UserOperationEvent")
        .indexed("userOpHash", ParamType::Hash)
        .indexed("sender", ParamType::Address)
        .indexed("paymaster", ParamType::Address)
        .param("nonce", UINT256)
        .param("success", ParamType::Bool)
        .param("actualGasCost", UINT256)
        .param("actualGasUsed", UINT256)
}

/// `UserOperationRevertReason(bytes32 indexed userOpHash, address indexed sender, uint256 nonce, bytes revertReason)`
pub fn user_operation_revert_reason() -> EventSchema {
    EventSchema::new(CONTRACT, "UserOperationRevertReason")
        .indexed("userOpHash", ParamType::Hash)
        .indexed("sender", ParamType::Address)
        .param("nonce", UINT256)
        .param("revertReason", ParamType::Bytes)
}

/// `Withdrawn(address indexed account, address withdrawAddress, uint256 amount)`
pub fn withdrawn() -> EventSchema {
    EventSchema::new(CONTRACT, "Withdrawn")
        .indexed("account", ParamType::Address)
        .param("withdrawAddress", ParamType::Address)
        .param("amount", UINT256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_match_solidity() {
        assert_eq!(
            account_deployed().signature(),
            "AccountDeployed(bytes32,address,address,address)"
        );
        assert_eq!(
            user_operation_event().signature(),
            "UserOperationEvent(bytes32,address,address,uint256,bool,uint256,uint256)"
        );
        assert_eq!(
            user_operation_revert_reason().signature(),
            "UserOperationRevertReason(bytes32,address,uint256,bytes)"
        );
        assert_eq!(before_execution().signature(), "BeforeExecution()");
    }

    #[test]
    fn indexed_flags() {
        let schema = user_operation_event();
        let indexed: Vec<&str> = schema
            .params
            .iter()
            .filter(|p| p.indexed)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(indexed, vec!["userOpHash", "sender", "paymaster"]);
    }
}
