use crate::domain::error::ForwardError;
use crate::domain::types::{Action, TxOptions, TxReceipt};
use crate::forwarder::TransactionSubmitter;
use crate::resolver::EntityDirectory;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

/// Minimal single-threaded executor for driving futures in tests.
pub(crate) fn block_on_with_spin<F: Future>(future: F) -> F::Output {
    unsafe fn clone(_ptr: *const ()) -> RawWaker {
        dummy_raw_waker()
    }
    unsafe fn wake(_ptr: *const ()) {}
    unsafe fn wake_by_ref(_ptr: *const ()) {}
    unsafe fn drop(_ptr: *const ()) {}

    fn dummy_raw_waker() -> RawWaker {
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut context = Context::from_waker(&waker);
    let mut future = Box::pin(future);

    for _ in 0..10_000 {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::hint::spin_loop(),
        }
    }

    panic!("future did not complete in test polling loop");
}

pub(crate) struct StaticDirectory {
    entries: HashMap<String, Address>,
}

impl StaticDirectory {
    pub(crate) fn new(entries: &[(&str, Address)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, address)| ((*name).to_string(), *address))
                .collect(),
        }
    }
}

#[async_trait(?Send)]
impl EntityDirectory for StaticDirectory {
    async fn resolve(&self, name: &str) -> Result<Address, ForwardError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ForwardError::unresolved_entity(name))
    }
}

/// Records every submission; optionally errors or reverts at a given call index.
#[derive(Default)]
pub(crate) struct RecordingSubmitter {
    submitted: RefCell<Vec<(Action, TxOptions)>>,
    fail_at: Option<usize>,
    revert_at: Option<usize>,
}

impl RecordingSubmitter {
    pub(crate) fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub(crate) fn reverting_at(index: usize) -> Self {
        Self {
            revert_at: Some(index),
            ..Self::default()
        }
    }

    pub(crate) fn submitted(&self) -> Vec<(Action, TxOptions)> {
        self.submitted.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TransactionSubmitter for RecordingSubmitter {
    async fn submit(&self, action: &Action, options: &TxOptions) -> Result<TxReceipt, ForwardError> {
        let index = {
            let mut submitted = self.submitted.borrow_mut();
            submitted.push((action.clone(), *options));
            submitted.len() - 1
        };
        if self.fail_at == Some(index) {
            return Err(ForwardError::submission(format!("mock rejection at {index}")));
        }
        Ok(TxReceipt {
            tx_hash: format!("0x{index:064x}"),
            block_number: Some(index as u64 + 1),
            success: self.revert_at != Some(index),
        })
    }
}
