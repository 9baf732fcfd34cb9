//! Call-data encoding.
//!
//! Produces `selector || args` where `args` follows the contract ABI head/tail layout:
//! static values are written in place in the head, dynamic values (`bytes`, `string`,
//! `T[]`, and fixed arrays of dynamic elements) contribute a 32-byte offset word to the
//! head and append their payload to the tail.
use crate::abi::signature::{AbiType, Signature};
use crate::domain::error::ForwardError;
use crate::domain::types::{parse_hex_blob, AbiValue};
use alloy_primitives::{Bytes, U256};

/// Parses `signature` and encodes `params` against it.
pub fn encode_call_data(signature: &str, params: &[AbiValue]) -> Result<Bytes, ForwardError> {
    let signature = Signature::parse(signature)?;
    encode_call(&signature, params)
}

pub fn encode_call(signature: &Signature, params: &[AbiValue]) -> Result<Bytes, ForwardError> {
    if signature.inputs.len() != params.len() {
        return Err(ForwardError::ArityMismatch {
            signature: signature.text.clone(),
            expected: signature.inputs.len(),
            actual: params.len(),
        });
    }

    let mut out = signature.selector().to_vec();
    if signature.inputs.is_empty() {
        return Ok(out.into());
    }
    out.extend_from_slice(&encode_params(&signature.inputs, params, "arg")?);
    Ok(out.into())
}

/// Encodes a tuple of values in head/tail layout.
pub fn encode_params(
    kinds: &[AbiType],
    values: &[AbiValue],
    field: &str,
) -> Result<Vec<u8>, ForwardError> {
    if kinds.len() != values.len() {
        return Err(ForwardError::ArityMismatch {
            signature: field.to_string(),
            expected: kinds.len(),
            actual: values.len(),
        });
    }

    // Head size is needed up front so tail offsets can be computed in one pass.
    let head_size_words = kinds
        .iter()
        .map(|kind| kind.static_words().unwrap_or(1))
        .fold(0usize, usize::saturating_add);
    let head_size_bytes = head_size_words.saturating_mul(32);

    let mut head = Vec::with_capacity(head_size_bytes);
    let mut tail = Vec::new();
    for (index, (kind, value)) in kinds.iter().zip(values.iter()).enumerate() {
        let field = format!("{field}[{index}]");
        if kind.is_dynamic() {
            let offset = head_size_bytes.saturating_add(tail.len());
            head.extend_from_slice(&encode_u256_word(U256::from(offset)));
            tail.extend_from_slice(&encode_dynamic(kind, value, &field)?);
        } else {
            head.extend_from_slice(&encode_static(kind, value, &field)?);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_static(kind: &AbiType, value: &AbiValue, field: &str) -> Result<Vec<u8>, ForwardError> {
    if let AbiType::FixedArray(element, len) = kind {
        let values = array_values(kind, value, field, Some(*len))?;
        let mut out = Vec::with_capacity(len.saturating_mul(32));
        for (index, item) in values.iter().enumerate() {
            out.extend_from_slice(&encode_static(element, item, &format!("{field}[{index}]"))?);
        }
        return Ok(out);
    }
    encode_primitive_word(kind, value, field).map(|word| word.to_vec())
}

fn encode_dynamic(kind: &AbiType, value: &AbiValue, field: &str) -> Result<Vec<u8>, ForwardError> {
    match kind {
        AbiType::Array(element) => {
            let values = array_values(kind, value, field, None)?;
            let repeated = vec![element.as_ref().clone(); values.len()];
            let mut out = encode_u256_word(U256::from(values.len())).to_vec();
            out.extend_from_slice(&encode_params(&repeated, values, field)?);
            Ok(out)
        }
        AbiType::FixedArray(element, len) => {
            let values = array_values(kind, value, field, Some(*len))?;
            let repeated = vec![element.as_ref().clone(); values.len()];
            encode_params(&repeated, values, field)
        }
        AbiType::Bytes => Ok(encode_dynamic_bytes(&blob_bytes(kind, value, field)?)),
        AbiType::String => match value {
            AbiValue::String(text) => Ok(encode_dynamic_bytes(text.as_bytes())),
            other => Err(mismatch(kind, other, field)),
        },
        other => Err(mismatch(other, value, field)),
    }
}

fn array_values<'a>(
    kind: &AbiType,
    value: &'a AbiValue,
    field: &str,
    expected_len: Option<usize>,
) -> Result<&'a [AbiValue], ForwardError> {
    let AbiValue::Array(values) = value else {
        return Err(mismatch(kind, value, field));
    };
    if let Some(expected) = expected_len {
        if values.len() != expected {
            return Err(ForwardError::ArityMismatch {
                signature: format!("{field} ({kind})"),
                expected,
                actual: values.len(),
            });
        }
    }
    Ok(values)
}

fn encode_primitive_word(
    kind: &AbiType,
    value: &AbiValue,
    field: &str,
) -> Result<[u8; 32], ForwardError> {
    if !has_encodable_width(kind) {
        return Err(ForwardError::UnsupportedType {
            kind: kind.to_string(),
        });
    }
    let mut word = [0u8; 32];
    match (kind, value) {
        (AbiType::Address, AbiValue::Address(address)) => {
            word[12..].copy_from_slice(address.as_slice());
            Ok(word)
        }
        (AbiType::Bool, AbiValue::Bool(flag)) => Ok(encode_u256_word(U256::from(u8::from(*flag)))),
        (AbiType::Uint(bits), AbiValue::Uint(number)) => {
            if number.bit_len() > *bits {
                return Err(out_of_range(kind, value, field));
            }
            Ok(encode_u256_word(*number))
        }
        (AbiType::Uint(bits), AbiValue::Int(number)) => {
            let Ok(unsigned) = u128::try_from(*number) else {
                return Err(out_of_range(kind, value, field));
            };
            let number = U256::from(unsigned);
            if number.bit_len() > *bits {
                return Err(out_of_range(kind, value, field));
            }
            Ok(encode_u256_word(number))
        }
        (AbiType::Int(bits), AbiValue::Uint(number)) => {
            // Positive values must leave the sign bit clear.
            if number.bit_len() >= *bits {
                return Err(out_of_range(kind, value, field));
            }
            Ok(encode_u256_word(*number))
        }
        (AbiType::Int(bits), AbiValue::Int(number)) => {
            if *bits < 128 {
                let limit = 1i128 << (bits - 1);
                if *number < -limit || *number >= limit {
                    return Err(out_of_range(kind, value, field));
                }
            }
            Ok(encode_i128_word(*number))
        }
        (AbiType::FixedBytes(width), _) => {
            let bytes = blob_bytes(kind, value, field)?;
            if bytes.len() > *width {
                return Err(out_of_range(kind, value, field));
            }
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(word)
        }
        _ => Err(mismatch(kind, value, field)),
    }
}

/// Hand-built types may carry widths `AbiType::parse` would never produce.
fn has_encodable_width(kind: &AbiType) -> bool {
    match kind {
        AbiType::Uint(bits) | AbiType::Int(bits) => *bits > 0 && *bits <= 256 && bits % 8 == 0,
        AbiType::FixedBytes(width) => *width > 0 && *width <= 32,
        _ => true,
    }
}

fn blob_bytes(kind: &AbiType, value: &AbiValue, field: &str) -> Result<Vec<u8>, ForwardError> {
    match value {
        AbiValue::Bytes(bytes) => Ok(bytes.to_vec()),
        AbiValue::String(raw) => parse_hex_blob(raw).ok_or_else(|| mismatch(kind, value, field)),
        other => Err(mismatch(kind, other, field)),
    }
}

/// Length word followed by the payload zero-padded to the next 32-byte boundary.
fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padding = (32 - bytes.len() % 32) % 32;
    let mut out = Vec::with_capacity(32 + bytes.len() + padding);
    out.extend_from_slice(&encode_u256_word(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    out.resize(out.len() + padding, 0);
    out
}

fn encode_u256_word(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

/// Two's-complement, sign-extended to 32 bytes.
fn encode_i128_word(value: i128) -> [u8; 32] {
    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut word = [fill; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn mismatch(kind: &AbiType, value: &AbiValue, field: &str) -> ForwardError {
    ForwardError::TypeMismatch {
        field: field.to_string(),
        kind: kind.to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(kind: &AbiType, value: &AbiValue, field: &str) -> ForwardError {
    ForwardError::ValueOutOfRange {
        field: field.to_string(),
        kind: kind.to_string(),
        value: value.to_string(),
    }
}
