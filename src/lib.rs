//! Compiles human-friendly contract calls into a single call script and forwards it
//! through a forwarding contract.
//!
//! Pipeline: raw params → [`resolver`] → [`abi::encoder`] → [`Action`] →
//! [`producer::aggregate`] → [`script`] → [`forwarder`].

pub mod abi;
pub mod config;
mod domain;
pub mod forwarder;
pub mod producer;
pub mod resolver;
pub mod safe;
pub mod script;

#[cfg(test)]
mod test_support;

pub use abi::encoder::{encode_call, encode_call_data};
pub use abi::signature::{selector, AbiType, Signature};
pub use config::ForwarderConfig;
pub use domain::error::ForwardError;
pub use domain::types::{
    parse_address, AbiValue, Action, Entity, ParamValue, SubmissionPlan, TxOptions, TxReceipt,
    ZERO_ADDRESS_ENTITIES,
};
pub use forwarder::{encode, forward, submit_plan, TransactionSubmitter, FORWARD_SIGNATURE};
pub use producer::{aggregate, encode_action, producer_fn, ActionProducer, CallProducer, Sequence};
pub use resolver::{EntityDirectory, ParamResolver, DEFAULT_DECIMALS};
pub use script::{decode_call_script, encode_call_script, ScriptEntry, DEFAULT_SPEC_ID};
