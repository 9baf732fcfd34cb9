use thiserror::Error;

/// Every way a compile or forward call can fail. All variants are terminal for the
/// call that produced them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForwardError {
    #[error("wrong signature format: {signature} ({reason})")]
    InvalidSignature { signature: String, reason: String },

    #[error("unsupported abi type: {kind}")]
    UnsupportedType { kind: String },

    #[error("argument count mismatch for {signature}: expected {expected} got {actual}")]
    ArityMismatch {
        signature: String,
        expected: usize,
        actual: usize,
    },

    #[error("expected array for type {kind}, got {value}")]
    ExpectedArray { kind: String, value: String },

    #[error("invalid number {value} for type {kind}: {reason}")]
    InvalidNumber {
        value: String,
        kind: String,
        reason: String,
    },

    #[error("expected boolean true/false for type {kind}, got {value}")]
    InvalidBoolean { value: String, kind: String },

    #[error("invalid address {value} for type {kind}: address must be a 0x-prefixed 20-byte hex string")]
    InvalidAddress { value: String, kind: String },

    #[error("unresolved entity {name} for type {kind}")]
    UnresolvedEntity { name: String, kind: String },

    #[error("{field} value {value} does not fit {kind}")]
    ValueOutOfRange {
        field: String,
        kind: String,
        value: String,
    },

    #[error("{field} cannot encode {value} as {kind}")]
    TypeMismatch {
        field: String,
        kind: String,
        value: String,
    },

    #[error("no actions provided")]
    NoActions,

    /// Call script entries have no value field, so attached wei cannot be forwarded.
    #[error("action {index} to {to} carries value {value} that a call script cannot forward")]
    UnforwardableValue {
        index: usize,
        to: String,
        value: String,
    },

    #[error("malformed call script: {reason}")]
    MalformedScript { reason: String },

    #[error("submission failed: {reason}")]
    Submission { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl ForwardError {
    pub fn submission(reason: impl Into<String>) -> Self {
        Self::Submission {
            reason: reason.into(),
        }
    }

    /// An entity name that could not be mapped to an address.
    pub fn unresolved_entity(name: impl Into<String>) -> Self {
        Self::UnresolvedEntity {
            name: name.into(),
            kind: "address".to_string(),
        }
    }

    pub(crate) fn malformed_script(reason: impl Into<String>) -> Self {
        Self::MalformedScript {
            reason: reason.into(),
        }
    }

    /// Format errors are raised before any encoding work starts.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature { .. } | Self::UnsupportedType { .. } | Self::ArityMismatch { .. }
        )
    }

    pub fn is_coercion_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedArray { .. }
                | Self::InvalidNumber { .. }
                | Self::InvalidBoolean { .. }
                | Self::InvalidAddress { .. }
                | Self::UnresolvedEntity { .. }
        )
    }
}
