//! Typed event parameter and entity attribute values.
//!
//! Decoded logs reach the projection layer with their parameters already
//! normalized into [`Value`]. Each value carries its own [`ParamType`] so an
//! envelope can be checked against the declared event schema before any
//! projection sees it.

use alloy_primitives::{hex, Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Solidity-level type of an event parameter or entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// 20-byte EVM address
    Address,
    /// Unsigned integer. Width in bits (8..=256).
    Uint(u16),
    /// Signed integer. Width in bits (8..=256).
    Int(u16),
    Bool,
    /// UTF-8 string
    Str,
    /// 32-byte hash (`bytes32`)
    Hash,
    /// Variable-length byte array
    Bytes,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Str => write!(f, "string"),
            ParamType::Hash => write!(f, "bytes32"),
            ParamType::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for ParamType {
    type Err = String;

    /// Parse a Solidity type name (`"uint256"`, `"address"`, `"bytes32"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "address" => return Ok(ParamType::Address),
            "bool" => return Ok(ParamType::Bool),
            "string" => return Ok(ParamType::Str),
            "bytes32" => return Ok(ParamType::Hash),
            "bytes" => return Ok(ParamType::Bytes),
            "uint" => return Ok(ParamType::Uint(256)),
            "int" => return Ok(ParamType::Int(256)),
            _ => {}
        }
        let (signed, digits) = if let Some(d) = s.strip_prefix("uint") {
            (false, d)
        } else if let Some(d) = s.strip_prefix("int") {
            (true, d)
        } else {
            return Err(format!("unsupported type '{s}'"));
        };
        let bits: u16 = digits
            .parse()
            .map_err(|_| format!("unsupported type '{s}'"))?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(format!("invalid integer width in '{s}'"));
        }
        Ok(if signed {
            ParamType::Int(bits)
        } else {
            ParamType::Uint(bits)
        })
    }
}

/// A decoded, typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Address(Address),
    Uint(U256),
    Int(I256),
    Bool(bool),
    Str(String),
    Hash(B256),
    Bytes(Bytes),
}

impl Value {
    /// Returns `true` if this value may be stored in a slot of type `ty`.
    ///
    /// Integers must also fit the declared bit width: `uintN` in
    /// `[0, 2^N)`, `intN` in `[-2^(N-1), 2^(N-1))`.
    pub fn matches(&self, ty: ParamType) -> bool {
        match (self, ty) {
            (Value::Address(_), ParamType::Address) => true,
            (Value::Uint(v), ParamType::Uint(bits)) => v.bit_len() <= bits as usize,
            (Value::Int(v), ParamType::Int(bits)) => fits_signed(*v, bits),
            (Value::Bool(_), ParamType::Bool) => true,
            (Value::Str(_), ParamType::Str) => true,
            (Value::Hash(_), ParamType::Hash) => true,
            (Value::Bytes(_), ParamType::Bytes) => true,
            _ => false,
        }
    }

    /// A short type label for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Address(_) => "address",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Hash(_) => "bytes32",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<B256> {
        match self {
            Value::Hash(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_ref()),
            _ => None,
        }
    }
}

fn fits_signed(v: I256, bits: u16) -> bool {
    if bits == 0 {
        return false;
    }
    let magnitude = usize::from(bits.min(256) - 1);
    let abs = v.unsigned_abs();
    abs.bit_len() <= magnitude || (v.is_negative() && abs == U256::from(1u8) << magnitude)
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        Value::Address(v)
    }
}

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Value::Uint(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(U256::from(v))
    }
}

impl From<I256> for Value {
    fn from(v: I256) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<B256> for Value {
    fn from(v: B256) -> Self {
        Value::Hash(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(a) => write!(f, "{a}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Hash(h) => write!(f, "{h}"),
            Value::Bytes(b) => write!(f, "{}", hex::encode_prefixed(b)),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_type_parse_and_display() {
        for name in ["address", "uint256", "uint48", "int24", "bool", "string", "bytes32", "bytes"] {
            let ty: ParamType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert_eq!("uint".parse::<ParamType>().unwrap(), ParamType::Uint(256));
    }

    #[test]
    fn param_type_rejects_bad_widths() {
        assert!("uint7".parse::<ParamType>().is_err());
        assert!("uint512".parse::<ParamType>().is_err());
        assert!("tuple".parse::<ParamType>().is_err());
    }

    #[test]
    fn uint_width_is_enforced() {
        let small = Value::from(255u64);
        assert!(small.matches(ParamType::Uint(8)));
        let big = Value::from(256u64);
        assert!(!big.matches(ParamType::Uint(8)));
        assert!(big.matches(ParamType::Uint(256)));
    }

    #[test]
    fn int_width_is_enforced() {
        let int = |v: i64| Value::Int(I256::try_from(v).expect("fits i256"));
        assert!(int(127).matches(ParamType::Int(8)));
        assert!(int(-128).matches(ParamType::Int(8)));
        assert!(!int(128).matches(ParamType::Int(8)));
        assert!(!int(-129).matches(ParamType::Int(8)));
        assert!(!int(100_000).matches(ParamType::Int(8)));
        assert!(int(100_000).matches(ParamType::Int(24)));
        assert!(Value::Int(I256::MIN).matches(ParamType::Int(256)));
        assert!(Value::Int(I256::MAX).matches(ParamType::Int(256)));
        assert!(!Value::Int(I256::MIN).matches(ParamType::Int(128)));
    }

    #[test]
    fn type_mismatch_detected() {
        assert!(!Value::Bool(true).matches(ParamType::Address));
        assert!(Value::Address(Address::ZERO).matches(ParamType::Address));
        assert_eq!(Value::Hash(B256::ZERO).kind(), "bytes32");
    }

    #[test]
    fn value_serde_roundtrip() {
        let v = Value::Uint(U256::from(42u64));
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn bytes_display_is_prefixed_hex() {
        let v = Value::Bytes(Bytes::from(vec![0xde, 0xad]));
        assert_eq!(v.to_string(), "0xdead");
    }
}
