use crate::domain::error::ForwardError;
use alloy_primitives::keccak256;
use std::fmt;

/// A parsed ABI parameter type. Tuples are not part of the accepted grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Bool,
    String,
    Bytes,
    FixedBytes(usize),
    Uint(usize),
    Int(usize),
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
}

impl AbiType {
    pub fn parse(raw: &str) -> Result<Self, ForwardError> {
        let unsupported = || ForwardError::UnsupportedType {
            kind: raw.to_string(),
        };
        let (base, suffix) = split_base_and_suffix(raw);
        let mut kind = parse_base_kind(base).ok_or_else(unsupported)?;
        for maybe_len in parse_array_suffix(suffix).ok_or_else(unsupported)? {
            kind = match maybe_len {
                None => Self::Array(Box::new(kind)),
                Some(0) => return Err(unsupported()),
                Some(len) => Self::FixedArray(Box::new(kind), len),
            };
        }
        Ok(kind)
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(element, _) => element.is_dynamic(),
            _ => false,
        }
    }

    /// Number of 32-byte words this type occupies in a head section when static.
    pub fn static_words(&self) -> Option<usize> {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => None,
            Self::FixedArray(element, len) => element
                .static_words()
                .map(|words| words.saturating_mul(*len)),
            _ => Some(1),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::FixedBytes(width) => write!(f, "bytes{width}"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::FixedArray(element, len) => write!(f, "{element}[{len}]"),
        }
    }
}

/// `name(type1,type2,...)` broken into its parts. `text` keeps the signature exactly as
/// written since the selector is hashed from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub inputs: Vec<AbiType>,
    pub text: String,
}

impl Signature {
    pub fn parse(raw: &str) -> Result<Self, ForwardError> {
        let invalid = |reason: &str| ForwardError::InvalidSignature {
            signature: raw.to_string(),
            reason: reason.to_string(),
        };

        let open = raw.find('(').ok_or_else(|| invalid("missing `(`"))?;
        let name = &raw[..open];
        if name.is_empty() {
            return Err(invalid("function name must be non-empty"));
        }
        if !name.chars().all(is_word_char) {
            return Err(invalid("function name must only contain word characters"));
        }
        let args = raw[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing `)`"))?;
        if args.contains('(') || args.contains(')') {
            return Err(invalid("nested parentheses are not supported"));
        }

        let mut inputs = Vec::new();
        if !args.is_empty() {
            for kind in args.split(',') {
                if kind.is_empty() {
                    return Err(invalid("empty parameter type"));
                }
                if !kind
                    .chars()
                    .all(|char| is_word_char(char) || char == '[' || char == ']')
                {
                    return Err(invalid("parameter types must not contain whitespace"));
                }
                inputs.push(AbiType::parse(kind)?);
            }
        }

        Ok(Self {
            name: name.to_string(),
            inputs,
            text: raw.to_string(),
        })
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(&self.text)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// First four bytes of the keccak256 hash of `signature`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_slice()[..4]);
    out
}

pub fn selector_hex(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

fn is_word_char(char: char) -> bool {
    char.is_ascii_alphanumeric() || char == '_'
}

fn split_base_and_suffix(kind: &str) -> (&str, &str) {
    if let Some(start) = kind.find('[') {
        (&kind[..start], &kind[start..])
    } else {
        (kind, "")
    }
}

fn parse_base_kind(base: &str) -> Option<AbiType> {
    match base {
        "address" => return Some(AbiType::Address),
        "bool" => return Some(AbiType::Bool),
        "string" => return Some(AbiType::String),
        "bytes" => return Some(AbiType::Bytes),
        _ => {}
    }
    if let Some(width) = base.strip_prefix("bytes") {
        let width = parse_width(width)?;
        return (1..=32).contains(&width).then_some(AbiType::FixedBytes(width));
    }
    if let Some(bits) = base.strip_prefix("uint") {
        return parse_integer_bits(bits).map(AbiType::Uint);
    }
    if let Some(bits) = base.strip_prefix("int") {
        return parse_integer_bits(bits).map(AbiType::Int);
    }
    None
}

fn parse_integer_bits(raw: &str) -> Option<usize> {
    if raw.is_empty() {
        return Some(256);
    }
    let bits = parse_width(raw)?;
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

fn parse_width(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.as_bytes().iter().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<usize>().ok()
}

/// Parses a chain of `[]` / `[N]` suffixes, innermost first.
fn parse_array_suffix(raw_suffix: &str) -> Option<Vec<Option<usize>>> {
    let bytes = raw_suffix.as_bytes();
    let mut dims = Vec::new();
    let mut index = 0usize;
    while index < bytes.len() {
        if bytes[index] != b'[' {
            return None;
        }
        index = index.saturating_add(1);
        let start = index;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index = index.saturating_add(1);
        }
        if index >= bytes.len() || bytes[index] != b']' {
            return None;
        }
        let digits = &raw_suffix[start..index];
        if digits.is_empty() {
            dims.push(None);
        } else {
            dims.push(Some(digits.parse::<usize>().ok()?));
        }
        index = index.saturating_add(1);
    }
    Some(dims)
}

#[cfg(test)]
mod tests {
    use super::{selector_hex, AbiType, Signature};
    use crate::domain::error::ForwardError;

    #[test]
    fn selector_hex_matches_known_selectors() {
        assert_eq!(selector_hex("transfer(address,uint256)"), "0xa9059cbb");
        assert_eq!(selector_hex("forward(bytes)"), "0xd948d468");
    }

    #[test]
    fn parse_signature_extracts_name_and_types() {
        let signature =
            Signature::parse("mint(address,uint256[][3],bool)").expect("signature should parse");
        assert_eq!(signature.name, "mint");
        assert_eq!(
            signature.inputs,
            vec![
                AbiType::Address,
                AbiType::FixedArray(Box::new(AbiType::Array(Box::new(AbiType::Uint(256)))), 3),
                AbiType::Bool,
            ]
        );
        assert_eq!(signature.inputs[1].to_string(), "uint256[][3]");
    }

    #[test]
    fn parse_signature_accepts_empty_parameter_list() {
        let signature = Signature::parse("pause()").expect("no-arg signature should parse");
        assert!(signature.inputs.is_empty());
        assert_eq!(signature.text, "pause()");
    }

    #[test]
    fn parse_signature_rejects_malformed_input() {
        for raw in [
            "transfer",
            "(address)",
            "transfer(address, uint256)",
            "transfer(address,)",
            "transfer(address",
            "foo((address,uint256))",
            "my-fn(uint256)",
        ] {
            let err = Signature::parse(raw).expect_err("malformed signature must fail");
            assert!(
                matches!(err, ForwardError::InvalidSignature { ref signature, .. } if signature == raw),
                "expected InvalidSignature for {raw}, got {err:?}"
            );
        }
    }

    #[test]
    fn parse_type_rejects_unknown_and_out_of_range_types() {
        for raw in ["uint7", "uint264", "bytes33", "bytes0", "widget", "uint256[0]", "uint[x]"] {
            let err = AbiType::parse(raw).expect_err("unsupported type must fail");
            assert!(err.is_format_error(), "expected format error for {raw}, got {err:?}");
        }
        assert_eq!(AbiType::parse("uint").expect("uint"), AbiType::Uint(256));
        assert_eq!(AbiType::parse("int8").expect("int8"), AbiType::Int(8));
    }

    #[test]
    fn static_words_account_for_fixed_arrays() {
        let kind = AbiType::parse("uint256[2][3]").expect("nested fixed array");
        assert!(!kind.is_dynamic());
        assert_eq!(kind.static_words(), Some(6));
        assert!(AbiType::parse("string[2]").expect("string[2]").is_dynamic());
    }
}
