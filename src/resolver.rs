//! Parameter coercion.
//!
//! Turns loosely-typed [`ParamValue`]s into [`AbiValue`]s by recursing over the parsed
//! [`AbiType`] tree:
//!
//! - `T[]` / `T[N]`: the value must be a list; each element is resolved against `T`.
//! - `address`: the value is resolved as an [`Entity`]; built-in names map to the zero
//!   address, well-formed addresses pass through, other names go to the directory.
//! - `uintN` / `intN`: literal numbers pass through; strings follow
//!   `<integer>[.<fraction>][e<precision>][<unit>]` and are scaled to fixed point.
//! - `bool`: only `true` / `false` literals.
//! - anything else passes through for the encoder to check.
//!
//! Deferred values are forced before they are inspected.
use crate::abi::signature::AbiType;
use crate::domain::error::ForwardError;
use crate::domain::types::{AbiValue, Entity, ParamValue};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub const DEFAULT_DECIMALS: u32 = 18;

/// U256 holds at most 78 decimal digits.
const MAX_DECIMALS: u32 = 77;

/// `e` is reserved for the exponent marker and never read as a unit.
const NUMERIC_LITERAL_PATTERN: &str = r"^(\d*(?:\.\d*)?)(?:e(\d+))?([a-df-zA-DF-Z]?)$";

pub const TIME_UNITS: &[(&str, u64)] = &[
    ("s", 1),
    ("m", 60),
    ("h", 3_600),
    ("d", 86_400),
    ("w", 604_800),
    ("y", 31_536_000),
];

/// Name → address lookup for identifiers that are neither addresses nor built-ins.
#[async_trait(?Send)]
pub trait EntityDirectory {
    async fn resolve(&self, name: &str) -> Result<Address, ForwardError>;
}

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<AbiValue, ForwardError>> + 'a>>;

#[derive(Clone)]
pub struct ParamResolver {
    decimals: u32,
    directory: Option<Arc<dyn EntityDirectory>>,
}

impl Default for ParamResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS)
    }
}

impl ParamResolver {
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn EntityDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub async fn resolve_entity(&self, entity: &Entity) -> Result<Address, ForwardError> {
        match entity {
            Entity::Address(address) => Ok(*address),
            Entity::Identifier(_) if entity.is_zero_address_builtin() => Ok(Address::ZERO),
            Entity::Identifier(name) => {
                let Some(directory) = self.directory.as_ref() else {
                    debug!("entity_unresolved name={name} reason=no_directory");
                    return Err(ForwardError::unresolved_entity(name.clone()));
                };
                let address = directory.resolve(name).await?;
                debug!("entity_resolved name={name} address={address}");
                Ok(address)
            }
        }
    }

    /// Resolves each parameter against the type at the same position.
    pub async fn resolve_params(
        &self,
        signature: &str,
        params: Vec<ParamValue>,
        kinds: &[AbiType],
    ) -> Result<Vec<AbiValue>, ForwardError> {
        if params.len() != kinds.len() {
            return Err(ForwardError::ArityMismatch {
                signature: signature.to_string(),
                expected: kinds.len(),
                actual: params.len(),
            });
        }
        let mut resolved = Vec::with_capacity(params.len());
        for (param, kind) in params.into_iter().zip(kinds.iter()) {
            resolved.push(self.resolve(param, kind).await?);
        }
        Ok(resolved)
    }

    pub fn resolve<'a>(&'a self, value: ParamValue, kind: &'a AbiType) -> ResolveFuture<'a> {
        Box::pin(async move {
            let value = value.force();
            match kind {
                AbiType::Array(element) | AbiType::FixedArray(element, _) => {
                    let ParamValue::List(items) = value else {
                        return Err(ForwardError::ExpectedArray {
                            kind: kind.to_string(),
                            value: format!("{value:?}"),
                        });
                    };
                    let mut resolved = Vec::with_capacity(items.len());
                    for item in items {
                        resolved.push(self.resolve(item, element).await?);
                    }
                    Ok(AbiValue::Array(resolved))
                }
                AbiType::Address => match value {
                    ParamValue::Address(address) => Ok(AbiValue::Address(address)),
                    ParamValue::Str(raw) => {
                        let address = self.resolve_entity(&Entity::parse(&raw)).await?;
                        Ok(AbiValue::Address(address))
                    }
                    other => Err(ForwardError::InvalidAddress {
                        value: format!("{other:?}"),
                        kind: kind.to_string(),
                    }),
                },
                AbiType::Uint(_) | AbiType::Int(_) => match value {
                    ParamValue::Uint(number) => Ok(AbiValue::Uint(number)),
                    ParamValue::Int(number) => Ok(AbiValue::Int(number)),
                    ParamValue::Str(raw) => {
                        resolve_number(&raw, self.decimals, kind).map(AbiValue::Uint)
                    }
                    other => Err(ForwardError::InvalidNumber {
                        value: format!("{other:?}"),
                        kind: kind.to_string(),
                        reason: "expected a number or numeric string".to_string(),
                    }),
                },
                AbiType::Bool => resolve_boolean(value, kind).map(AbiValue::Bool),
                _ => Ok(pass_through(value)),
            }
        })
    }
}

/// Parses `<integer>[.<fraction>][e<precision>][<unit>]` into a fixed-point integer.
///
/// `e<precision>` replaces `decimals` for this literal. The unit letter multiplies by
/// [`TIME_UNITS`]; letters not in the table multiply by one.
pub fn resolve_number(raw: &str, decimals: u32, kind: &AbiType) -> Result<U256, ForwardError> {
    let invalid = |reason: String| ForwardError::InvalidNumber {
        value: raw.to_string(),
        kind: kind.to_string(),
        reason,
    };
    let captures = numeric_literal_regex()
        .map_err(|reason| invalid(reason.to_string()))?
        .captures(raw)
        .ok_or_else(|| invalid("expected <integer>[.<fraction>][e<exponent>][<unit>]".to_string()))?;

    let amount = captures.get(1).map_or("", |m| m.as_str());
    let decimals = match captures.get(2) {
        Some(exponent) => exponent
            .as_str()
            .parse::<u32>()
            .map_err(|error| invalid(format!("invalid exponent: {error}")))?,
        None => decimals,
    };
    let unit = captures.get(3).map_or("", |m| m.as_str());

    let scaled = to_decimals(amount, decimals).map_err(invalid)?;
    scaled
        .checked_mul(U256::from(time_unit_multiplier(unit)))
        .ok_or_else(|| invalid("value overflows 256 bits".to_string()))
}

/// Scales a decimal string by `10^decimals` using digit arithmetic only.
pub fn to_decimals(amount: &str, decimals: u32) -> Result<U256, String> {
    if decimals > MAX_DECIMALS {
        return Err(format!("precision {decimals} exceeds {MAX_DECIMALS}"));
    }
    let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if integer.is_empty() && fraction.is_empty() {
        return Err("no digits".to_string());
    }
    let decimals = decimals as usize;
    if fraction.len() > decimals {
        return Err(format!(
            "fraction has {} digits but precision is {decimals}",
            fraction.len()
        ));
    }

    let mut digits = String::with_capacity(integer.len() + decimals);
    digits.push_str(integer);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(significant, 10).map_err(|error| format!("value out of range: {error}"))
}

pub fn time_unit_multiplier(unit: &str) -> u64 {
    TIME_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map_or(1, |(_, multiplier)| *multiplier)
}

pub fn resolve_boolean(value: ParamValue, kind: &AbiType) -> Result<bool, ForwardError> {
    match value.force() {
        ParamValue::Bool(flag) => Ok(flag),
        ParamValue::Str(raw) if raw == "true" => Ok(true),
        ParamValue::Str(raw) if raw == "false" => Ok(false),
        other => Err(ForwardError::InvalidBoolean {
            value: format!("{other:?}"),
            kind: kind.to_string(),
        }),
    }
}

fn pass_through(value: ParamValue) -> AbiValue {
    match value {
        ParamValue::Str(raw) => AbiValue::String(raw),
        ParamValue::Uint(number) => AbiValue::Uint(number),
        ParamValue::Int(number) => AbiValue::Int(number),
        ParamValue::Bool(flag) => AbiValue::Bool(flag),
        ParamValue::Address(address) => AbiValue::Address(address),
        ParamValue::Bytes(bytes) => AbiValue::Bytes(bytes),
        ParamValue::List(items) => AbiValue::Array(items.into_iter().map(pass_through).collect()),
        ParamValue::Deferred(producer) => pass_through(producer()),
    }
}

fn numeric_literal_regex() -> Result<&'static Regex, &'static str> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(NUMERIC_LITERAL_PATTERN).ok())
        .as_ref()
        .ok_or("numeric literal pattern failed to compile")
}
