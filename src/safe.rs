//! Owner, threshold, and module management calls on the forwarder itself.
//!
//! Each function returns a producer addressed to `config.forwarder`, so these calls can be
//! batched into a call script alongside any other action. Thresholds are plain counts and
//! are never decimal-scaled.

use crate::config::ForwarderConfig;
use crate::domain::types::{Entity, ParamValue};
use crate::producer::{encode_action, CallProducer};

const ADD_OWNER_SIGNATURE: &str = "addOwnerWithThreshold(address,uint256)";
const REMOVE_OWNER_SIGNATURE: &str = "removeOwner(address,address,uint256)";
const CHANGE_THRESHOLD_SIGNATURE: &str = "changeThreshold(uint256)";
const ENABLE_MODULE_SIGNATURE: &str = "enableModule(address)";
const DISABLE_MODULE_SIGNATURE: &str = "disableModule(address,address)";

fn entity_param(entity: impl Into<Entity>) -> ParamValue {
    let entity: Entity = entity.into();
    ParamValue::from(entity)
}

fn self_call(config: &ForwarderConfig, signature: &str, params: Vec<ParamValue>) -> CallProducer {
    encode_action(
        &config.resolver(),
        Entity::Address(config.forwarder),
        signature,
        params,
    )
}

pub fn add_owner(config: &ForwarderConfig, owner: impl Into<Entity>, threshold: u64) -> CallProducer {
    self_call(
        config,
        ADD_OWNER_SIGNATURE,
        vec![entity_param(owner), threshold.into()],
    )
}

/// `prev_owner` is the entry pointing at `owner` in the owner linked list.
pub fn remove_owner(
    config: &ForwarderConfig,
    prev_owner: impl Into<Entity>,
    owner: impl Into<Entity>,
    threshold: u64,
) -> CallProducer {
    self_call(
        config,
        REMOVE_OWNER_SIGNATURE,
        vec![entity_param(prev_owner), entity_param(owner), threshold.into()],
    )
}

pub fn change_threshold(config: &ForwarderConfig, threshold: u64) -> CallProducer {
    self_call(config, CHANGE_THRESHOLD_SIGNATURE, vec![threshold.into()])
}

pub fn add_module(config: &ForwarderConfig, module: impl Into<Entity>) -> CallProducer {
    self_call(config, ENABLE_MODULE_SIGNATURE, vec![entity_param(module)])
}

pub fn remove_module(
    config: &ForwarderConfig,
    prev_module: impl Into<Entity>,
    module: impl Into<Entity>,
) -> CallProducer {
    self_call(
        config,
        DISABLE_MODULE_SIGNATURE,
        vec![entity_param(prev_module), entity_param(module)],
    )
}
