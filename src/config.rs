use crate::domain::error::ForwardError;
use crate::domain::types::parse_address;
use crate::resolver::{ParamResolver, DEFAULT_DECIMALS};
use crate::script::DEFAULT_SPEC_ID;
use alloy_primitives::Address;
use serde::Deserialize;

/// Everything the coordinator needs to know about the forwarding account. Immutable once
/// built and passed by reference into each operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwarderConfig {
    /// The forwarding contract (multisig / safe) that receives the `forward(bytes)` call.
    pub forwarder: Address,
    pub spec_id: u32,
    /// Fixed-point precision applied to numeric string literals.
    pub decimals: u32,
}

#[derive(Deserialize)]
struct RawForwarderConfig {
    forwarder: String,
    #[serde(default)]
    spec_id: Option<u32>,
    #[serde(default)]
    decimals: Option<u32>,
}

impl ForwarderConfig {
    pub fn new(forwarder: Address) -> Self {
        Self {
            forwarder,
            spec_id: DEFAULT_SPEC_ID,
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ForwardError> {
        let parsed: RawForwarderConfig =
            serde_json::from_str(raw).map_err(|error| ForwardError::Config {
                reason: format!("invalid config json: {error}"),
            })?;
        let forwarder = parse_address(&parsed.forwarder).map_err(|_error| ForwardError::Config {
            reason: format!(
                "forwarder must be a 0x-prefixed 20-byte hex string, got {}",
                parsed.forwarder
            ),
        })?;
        let spec_id = parsed.spec_id.unwrap_or(DEFAULT_SPEC_ID);
        if spec_id == 0 {
            return Err(ForwardError::Config {
                reason: "spec_id must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            forwarder,
            spec_id,
            decimals: parsed.decimals.unwrap_or(DEFAULT_DECIMALS),
        })
    }

    /// A resolver using this config's precision and no directory.
    pub fn resolver(&self) -> ParamResolver {
        ParamResolver::new(self.decimals)
    }
}
