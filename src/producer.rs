use crate::abi::encoder::encode_call;
use crate::abi::signature::Signature;
use crate::domain::error::ForwardError;
use crate::domain::types::{Action, Entity, ParamValue};
use crate::resolver::ParamResolver;
use alloy_primitives::U256;
use async_trait::async_trait;
use std::future::Future;
use tracing::debug;

/// A deferred computation yielding zero or more actions in a fixed order.
#[async_trait(?Send)]
pub trait ActionProducer {
    async fn produce(&self) -> Result<Vec<Action>, ForwardError>;
}

#[async_trait(?Send)]
impl ActionProducer for Vec<Action> {
    async fn produce(&self) -> Result<Vec<Action>, ForwardError> {
        Ok(self.clone())
    }
}

/// Adapts an async closure into an [`ActionProducer`].
pub struct FnProducer<F>(F);

pub fn producer_fn<F, Fut>(producer: F) -> FnProducer<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<Action>, ForwardError>> + 'static,
{
    FnProducer(producer)
}

#[async_trait(?Send)]
impl<F, Fut> ActionProducer for FnProducer<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<Action>, ForwardError>> + 'static,
{
    async fn produce(&self) -> Result<Vec<Action>, ForwardError> {
        (self.0)().await
    }
}

/// A single contract call: `signature` on `target` with loosely-typed `params`.
#[derive(Clone)]
pub struct CallProducer {
    resolver: ParamResolver,
    target: Entity,
    signature: String,
    params: Vec<ParamValue>,
    value: U256,
}

impl CallProducer {
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

pub fn encode_action(
    resolver: &ParamResolver,
    target: impl Into<Entity>,
    signature: &str,
    params: Vec<ParamValue>,
) -> CallProducer {
    CallProducer {
        resolver: resolver.clone(),
        target: target.into(),
        signature: signature.to_string(),
        params,
        value: U256::ZERO,
    }
}

#[async_trait(?Send)]
impl ActionProducer for CallProducer {
    async fn produce(&self) -> Result<Vec<Action>, ForwardError> {
        // Signature format and arity are checked before any resolution work.
        let signature = Signature::parse(&self.signature)?;
        if self.params.len() != signature.inputs.len() {
            return Err(ForwardError::ArityMismatch {
                signature: signature.text,
                expected: signature.inputs.len(),
                actual: self.params.len(),
            });
        }
        let to = self.resolver.resolve_entity(&self.target).await?;
        let params = self
            .resolver
            .resolve_params(&signature.text, self.params.clone(), &signature.inputs)
            .await?;
        let data = encode_call(&signature, &params)?;
        debug!(
            "call_encoded signature={} to={to} data_len={}",
            signature.text,
            data.len()
        );
        Ok(vec![Action::new(to, data).with_value(self.value)])
    }
}

/// Several producers run one after another as a single producer.
pub struct Sequence(Vec<Box<dyn ActionProducer>>);

impl Sequence {
    pub fn new(producers: Vec<Box<dyn ActionProducer>>) -> Self {
        Self(producers)
    }
}

#[async_trait(?Send)]
impl ActionProducer for Sequence {
    async fn produce(&self) -> Result<Vec<Action>, ForwardError> {
        aggregate(&self.0).await
    }
}

/// Runs every producer strictly in order and concatenates their actions.
///
/// Each producer is awaited to completion before the next one starts; later calls may
/// depend on state changed by earlier ones.
pub async fn aggregate(producers: &[Box<dyn ActionProducer>]) -> Result<Vec<Action>, ForwardError> {
    let mut actions = Vec::new();
    for (index, producer) in producers.iter().enumerate() {
        let produced = producer.produce().await?;
        debug!("aggregate_producer_done index={index} actions={}", produced.len());
        actions.extend(produced);
    }
    debug!(
        "aggregate_done producers={} actions={}",
        producers.len(),
        actions.len()
    );
    Ok(actions)
}
