use crate::domain::error::ForwardError;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifiers that always resolve to the zero address without a directory lookup.
pub const ZERO_ADDRESS_ENTITIES: &[&str] = &["ETH", "XDAI", "ZERO_ADDRESS"];

/// A call target or `address` argument: either a concrete address or a name that still
/// needs resolving.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Address(Address),
    Identifier(String),
}

impl Entity {
    pub fn parse(raw: &str) -> Self {
        match parse_address(raw) {
            Ok(address) => Self::Address(address),
            Err(_) => Self::Identifier(raw.trim().to_string()),
        }
    }

    pub fn is_zero_address_builtin(&self) -> bool {
        match self {
            Self::Identifier(name) => ZERO_ADDRESS_ENTITIES.contains(&name.as_str()),
            Self::Address(_) => false,
        }
    }
}

impl From<Address> for Entity {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<&str> for Entity {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Entity {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address}"),
            Self::Identifier(name) => f.write_str(name),
        }
    }
}

/// One low-level instruction: call `to` with `data`, attaching `value` wei.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub to: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
}

impl Action {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Output of `encode`: the forward call plus anything that must land before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub main_action: Action,
    pub pre_actions: Vec<Action>,
}

/// Transaction tuning passed untouched to every submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub gas_limit: Option<U256>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    pub success: bool,
}

/// A loosely-typed call argument as supplied by the caller, before coercion against the
/// declared ABI type.
#[derive(Clone)]
pub enum ParamValue {
    Str(String),
    Uint(U256),
    Int(i128),
    Bool(bool),
    Address(Address),
    Bytes(Bytes),
    List(Vec<ParamValue>),
    /// Computed on demand, right before resolution.
    Deferred(Arc<dyn Fn() -> ParamValue + Send + Sync>),
}

impl ParamValue {
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> ParamValue + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(producer))
    }

    /// Forces deferred values until a concrete one is reached.
    pub fn force(self) -> Self {
        let mut current = self;
        while let Self::Deferred(producer) = current {
            current = producer();
        }
        current
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Address(value) => write!(f, "{value}"),
            Self::Bytes(value) => write!(f, "{value}"),
            Self::List(values) => f.debug_list().entries(values).finish(),
            Self::Deferred(_) => f.write_str("<deferred>"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<U256> for ParamValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(i128::from(value))
    }
}

impl From<Address> for ParamValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<Entity> for ParamValue {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Address(address) => Self::Address(address),
            Entity::Identifier(name) => Self::Str(name),
        }
    }
}

impl From<Bytes> for ParamValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A call argument after coercion, ready for ABI encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Int(i128),
    Bool(bool),
    Bytes(Bytes),
    String(String),
    Array(Vec<AbiValue>),
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Bytes(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Parses a 0x-prefixed 40-hex-digit address. Checksum casing is not enforced.
pub fn parse_address(raw: &str) -> Result<Address, ForwardError> {
    let trimmed = raw.trim();
    let invalid = || ForwardError::InvalidAddress {
        value: raw.to_string(),
        kind: "address".to_string(),
    };
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if without_prefix.len() != 40
        || !without_prefix
            .as_bytes()
            .iter()
            .all(|byte| byte.is_ascii_hexdigit())
    {
        return Err(invalid());
    }
    let mut out = [0u8; 20];
    hex::decode_to_slice(without_prefix, &mut out).map_err(|_error| invalid())?;
    Ok(Address::from(out))
}

/// Decodes a 0x-prefixed, even-length hex blob.
pub fn parse_hex_blob(raw: &str) -> Option<Vec<u8>> {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    if without_prefix.len() % 2 != 0 {
        return None;
    }
    hex::decode(without_prefix).ok()
}
