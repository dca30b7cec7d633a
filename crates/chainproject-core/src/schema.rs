//! Event schemas — the declared parameter list of one contract event.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProjectionError;
use crate::value::{ParamType, Value};

/// Definition of a single event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter name as declared in the ABI (e.g. `"userOpHash"`).
    pub name: String,
    /// Declared type.
    pub ty: ParamType,
    /// EVM: is this an indexed topic?
    #[serde(default)]
    pub indexed: bool,
}

/// The shape of one (contract, event) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSchema {
    /// Contract name the event belongs to (e.g. `"EntryPoint"`).
    pub contract: String,
    /// Event name (e.g. `"AccountDeployed"`).
    pub event: String,
    /// Ordered parameter definitions.
    pub params: Vec<ParamDef>,
}

impl EventSchema {
    /// Create a schema with no parameters.
    pub fn new(contract: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            event: event.into(),
            params: Vec::new(),
        }
    }

    /// Append a non-indexed parameter.
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamDef {
            name: name.into(),
            ty,
            indexed: false,
        });
        self
    }

    /// Append an indexed parameter.
    pub fn indexed(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamDef {
            name: name.into(),
            ty,
            indexed: true,
        });
        self
    }

    /// Look up a parameter definition by name.
    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Canonical signature, e.g. `"Deposited(address,uint256)"`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.event, types.join(","))
    }

    /// Check a decoded parameter map against this schema.
    ///
    /// Every declared parameter must be present with a matching type, and no
    /// undeclared parameter may appear.
    pub fn validate(&self, params: &BTreeMap<String, Value>) -> Result<(), ProjectionError> {
        for def in &self.params {
            match params.get(&def.name) {
                None => {
                    return Err(self.malformed(format!("missing param '{}'", def.name)));
                }
                Some(value) if !value.matches(def.ty) => {
                    return Err(self.malformed(format!(
                        "param '{}' expected {}, got {}",
                        def.name,
                        def.ty,
                        value.kind()
                    )));
                }
                Some(_) => {}
            }
        }
        if let Some(extra) = params.keys().find(|k| self.get(k).is_none()) {
            return Err(self.malformed(format!("undeclared param '{extra}'")));
        }
        Ok(())
    }

    fn malformed(&self, reason: String) -> ProjectionError {
        ProjectionError::malformed(&self.contract, &self.event, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, I256, U256};

    fn deposited() -> EventSchema {
        EventSchema::new("EntryPoint", "Deposited")
            .indexed("account", ParamType::Address)
            .param("totalDeposit", ParamType::Uint(256))
    }

    fn params(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn signature_lists_types_in_order() {
        assert_eq!(deposited().signature(), "Deposited(address,uint256)");
        assert_eq!(EventSchema::new("EntryPoint", "BeforeExecution").signature(), "BeforeExecution()");
    }

    #[test]
    fn validate_accepts_well_formed() {
        let p = params(&[
            ("account", Value::Address(Address::ZERO)),
            ("totalDeposit", Value::Uint(U256::from(7u64))),
        ]);
        assert!(deposited().validate(&p).is_ok());
    }

    #[test]
    fn validate_rejects_missing_param() {
        let p = params(&[("account", Value::Address(Address::ZERO))]);
        let err = deposited().validate(&p).unwrap_err();
        assert!(matches!(err, ProjectionError::MalformedEnvelope { .. }));
        assert!(err.to_string().contains("totalDeposit"));
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let p = params(&[
            ("account", Value::Bool(false)),
            ("totalDeposit", Value::Uint(U256::ZERO)),
        ]);
        let err = deposited().validate(&p).unwrap_err();
        assert!(err.to_string().contains("expected address, got bool"));
    }

    #[test]
    fn validate_rejects_undeclared_param() {
        let p = params(&[
            ("account", Value::Address(Address::ZERO)),
            ("totalDeposit", Value::Uint(U256::ZERO)),
            ("memo", Value::Str("hi".into())),
        ]);
        let err = deposited().validate(&p).unwrap_err();
        assert!(err.to_string().contains("undeclared param 'memo'"));
    }

    #[test]
    fn validate_rejects_int_overflowing_declared_width() {
        let schema = EventSchema::new("Pool", "Swap").param("tick", ParamType::Int(8));
        let p = params(&[("tick", Value::Int(I256::try_from(100_000i64).unwrap()))]);
        let err = schema.validate(&p).unwrap_err();
        assert!(matches!(err, ProjectionError::MalformedEnvelope { .. }));

        let p = params(&[("tick", Value::Int(I256::try_from(-128i64).unwrap()))]);
        assert!(schema.validate(&p).is_ok());
    }
}
