//! Forwarding coordinator.
//!
//! [`encode`] aggregates producers into one call script and wraps it in a
//! `forward(bytes)` call addressed to the configured forwarder. [`forward`] then submits
//! the resulting [`SubmissionPlan`]: every pre-action in order, each confirmed before the
//! next is sent, then the main action. The first failure stops the sequence; nothing
//! already confirmed is undone.
//!
//! Script entries have no value field, so an aggregated action carrying wei is rejected
//! rather than forwarded without it.
use crate::abi::encoder::encode_call_data;
use crate::config::ForwarderConfig;
use crate::domain::error::ForwardError;
use crate::domain::types::{AbiValue, Action, SubmissionPlan, TxOptions, TxReceipt};
use crate::producer::{aggregate, ActionProducer};
use crate::script::encode_call_script;
use async_trait::async_trait;
use tracing::{info, warn};

pub const FORWARD_SIGNATURE: &str = "forward(bytes)";

/// Sends a transaction and resolves once it has reached a terminal confirmed state.
#[async_trait(?Send)]
pub trait TransactionSubmitter {
    async fn submit(&self, action: &Action, options: &TxOptions) -> Result<TxReceipt, ForwardError>;
}

pub async fn encode(
    config: &ForwarderConfig,
    producers: &[Box<dyn ActionProducer>],
) -> Result<SubmissionPlan, ForwardError> {
    let actions = aggregate(producers).await?;
    if actions.is_empty() {
        warn!("forward_encode_rejected reason=no_actions producers={}", producers.len());
        return Err(ForwardError::NoActions);
    }
    if let Some((index, action)) = actions
        .iter()
        .enumerate()
        .find(|(_, action)| !action.value.is_zero())
    {
        warn!(
            "forward_encode_rejected reason=value_on_inner_action index={index} to={} value={}",
            action.to, action.value
        );
        return Err(ForwardError::UnforwardableValue {
            index,
            to: action.to.to_string(),
            value: action.value.to_string(),
        });
    }

    let script = encode_call_script(&actions, config.spec_id)?;
    let data = encode_call_data(FORWARD_SIGNATURE, &[AbiValue::Bytes(script)])?;
    info!(
        "forward_encoded forwarder={} actions={} data_len={}",
        config.forwarder,
        actions.len(),
        data.len()
    );

    Ok(SubmissionPlan {
        main_action: Action::new(config.forwarder, data),
        pre_actions: Vec::new(),
    })
}

pub async fn forward(
    config: &ForwarderConfig,
    submitter: &dyn TransactionSubmitter,
    producers: &[Box<dyn ActionProducer>],
    options: &TxOptions,
) -> Result<TxReceipt, ForwardError> {
    let plan = encode(config, producers).await?;
    submit_plan(submitter, &plan, options).await
}

/// Submits `plan.pre_actions` one at a time, then `plan.main_action`.
///
/// A pre-action whose receipt reports failure aborts the plan like a submission error.
/// The main action's receipt is returned as-is.
pub async fn submit_plan(
    submitter: &dyn TransactionSubmitter,
    plan: &SubmissionPlan,
    options: &TxOptions,
) -> Result<TxReceipt, ForwardError> {
    for (index, action) in plan.pre_actions.iter().enumerate() {
        info!("forward_pre_action_submit index={index} to={}", action.to);
        let receipt = submitter.submit(action, options).await.map_err(|error| {
            warn!("forward_pre_action_failed index={index} error={error}");
            error
        })?;
        if !receipt.success {
            warn!(
                "forward_pre_action_reverted index={index} tx_hash={}",
                receipt.tx_hash
            );
            return Err(ForwardError::submission(format!(
                "pre-action {index} reverted in {}",
                receipt.tx_hash
            )));
        }
        info!(
            "forward_pre_action_confirmed index={index} tx_hash={}",
            receipt.tx_hash
        );
    }

    info!("forward_main_action_submit to={}", plan.main_action.to);
    let receipt = submitter
        .submit(&plan.main_action, options)
        .await
        .map_err(|error| {
            warn!("forward_main_action_failed error={error}");
            error
        })?;
    info!(
        "forward_main_action_confirmed tx_hash={} success={}",
        receipt.tx_hash, receipt.success
    );
    Ok(receipt)
}
