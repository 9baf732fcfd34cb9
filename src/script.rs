//! Call script framing.
//!
//! Layout: `spec_id (4 bytes BE) || repeat { to (20 bytes) | len (4 bytes BE) | data (len bytes) }`.
//! Payloads are opaque here; nothing past the length prefix is inspected.
use crate::domain::error::ForwardError;
use crate::domain::types::Action;
use alloy_primitives::{Address, Bytes};
use tracing::debug;

pub const DEFAULT_SPEC_ID: u32 = 1;

const SPEC_ID_LEN: usize = 4;
const ADDRESS_LEN: usize = 20;
const LENGTH_LEN: usize = 4;

/// One `(to, data)` pair read back from a call script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptEntry {
    pub to: Address,
    pub data: Bytes,
}

pub fn encode_call_script(actions: &[Action], spec_id: u32) -> Result<Bytes, ForwardError> {
    let body_len = actions
        .iter()
        .map(|action| ADDRESS_LEN + LENGTH_LEN + action.data.len())
        .fold(0usize, usize::saturating_add);
    let mut script = Vec::with_capacity(SPEC_ID_LEN.saturating_add(body_len));
    script.extend_from_slice(&spec_id.to_be_bytes());
    for (index, action) in actions.iter().enumerate() {
        let len = u32::try_from(action.data.len()).map_err(|_error| {
            ForwardError::malformed_script(format!(
                "action {index} payload of {} bytes exceeds the 4-byte length field",
                action.data.len()
            ))
        })?;
        script.extend_from_slice(action.to.as_slice());
        script.extend_from_slice(&len.to_be_bytes());
        script.extend_from_slice(&action.data);
    }
    debug!(
        "call_script_encoded spec_id={spec_id} actions={} bytes={}",
        actions.len(),
        script.len()
    );
    Ok(script.into())
}

/// Reads a call script front to back.
pub fn decode_call_script(script: &[u8]) -> Result<(u32, Vec<ScriptEntry>), ForwardError> {
    let header = script.get(..SPEC_ID_LEN).ok_or_else(|| {
        ForwardError::malformed_script(format!(
            "script of {} bytes is shorter than the spec id header",
            script.len()
        ))
    })?;
    let spec_id = read_u32(header);

    let mut entries = Vec::new();
    let mut cursor = SPEC_ID_LEN;
    while cursor < script.len() {
        let to_end = cursor + ADDRESS_LEN;
        let len_end = to_end + LENGTH_LEN;
        let to = script.get(cursor..to_end).ok_or_else(|| {
            ForwardError::malformed_script(format!("truncated address at offset {cursor}"))
        })?;
        let len_bytes = script.get(to_end..len_end).ok_or_else(|| {
            ForwardError::malformed_script(format!("truncated length at offset {to_end}"))
        })?;
        let data_len = read_u32(len_bytes) as usize;
        let data_end = len_end.saturating_add(data_len);
        let data = script.get(len_end..data_end).ok_or_else(|| {
            ForwardError::malformed_script(format!(
                "payload of {data_len} bytes at offset {len_end} runs past end of script"
            ))
        })?;
        entries.push(ScriptEntry {
            to: Address::from_slice(to),
            data: Bytes::copy_from_slice(data),
        });
        cursor = data_end;
    }
    Ok((spec_id, entries))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(out)
}
