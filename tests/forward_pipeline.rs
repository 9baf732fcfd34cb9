use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use callscript::{
    decode_call_script, encode, encode_action, forward, producer_fn, safe, selector,
    ActionProducer, Action, EntityDirectory, ForwardError, ForwarderConfig, ParamValue,
    TransactionSubmitter, TxOptions, TxReceipt, FORWARD_SIGNATURE,
};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

const SAFE: &str = "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a";
const TOKEN: &str = "0x2222222222222222222222222222222222222222";
const RECIPIENT: &str = "0x3333333333333333333333333333333333333333";

fn block_on_with_spin<F: Future>(future: F) -> F::Output {
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

fn config() -> ForwarderConfig {
    ForwarderConfig::from_json(&format!(r#"{{"forwarder":"{SAFE}","decimals":18}}"#))
        .expect("config should parse")
}

struct AppDirectory;

#[async_trait(?Send)]
impl EntityDirectory for AppDirectory {
    async fn resolve(&self, name: &str) -> Result<Address, ForwardError> {
        match name {
            "token" => Ok(Address::repeat_byte(0x22)),
            _ => Err(ForwardError::unresolved_entity(name)),
        }
    }
}

#[derive(Default)]
struct ChainLog {
    submitted: RefCell<Vec<Action>>,
}

#[async_trait(?Send)]
impl TransactionSubmitter for ChainLog {
    async fn submit(&self, action: &Action, _options: &TxOptions) -> Result<TxReceipt, ForwardError> {
        let mut submitted = self.submitted.borrow_mut();
        submitted.push(action.clone());
        Ok(TxReceipt {
            tx_hash: format!("0x{:064x}", submitted.len()),
            block_number: Some(submitted.len() as u64),
            success: true,
        })
    }
}

fn embedded_script(data: &[u8]) -> Vec<u8> {
    assert_eq!(&data[..4], &selector(FORWARD_SIGNATURE));
    let len = U256::from_be_slice(&data[36..68]).to::<usize>();
    data[68..68 + len].to_vec()
}

#[test]
fn forward_compiles_batched_calls_into_one_transaction() {
    let config = config();
    let resolver = config.resolver().with_directory(Arc::new(AppDirectory));
    let producers: Vec<Box<dyn ActionProducer>> = vec![
        Box::new(encode_action(
            &resolver,
            "token",
            "approve(address,uint256)",
            vec![RECIPIENT.into(), "2.5".into()],
        )),
        Box::new(encode_action(
            &resolver,
            TOKEN,
            "transfer(address,uint256)",
            vec![RECIPIENT.into(), "1000e0".into()],
        )),
        Box::new(safe::change_threshold(&config, 2)),
    ];

    let chain = ChainLog::default();
    let receipt = block_on_with_spin(forward(&config, &chain, &producers, &TxOptions::default()))
        .expect("forward should succeed");
    assert!(receipt.success);

    let submitted = chain.submitted.borrow();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].to, Address::repeat_byte(0x5a));

    let script = embedded_script(&submitted[0].data);
    let (spec_id, entries) = decode_call_script(&script).expect("script should parse");
    assert_eq!(spec_id, 1);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].to, Address::repeat_byte(0x22));
    assert_eq!(entries[1].to, Address::repeat_byte(0x22));
    assert_eq!(entries[2].to, Address::repeat_byte(0x5a));

    // 2.5 scaled by 18 decimals
    let approve_amount = U256::from_be_slice(&entries[0].data[36..68]);
    assert_eq!(approve_amount, U256::from(2_500_000_000_000_000_000u64));
    let transfer_amount = U256::from_be_slice(&entries[1].data[36..68]);
    assert_eq!(transfer_amount, U256::from(1_000u64));
}

#[test]
fn producers_run_in_order_and_see_earlier_effects() {
    let config = config();
    let counter = Rc::new(Cell::new(0u64));
    let first = Rc::clone(&counter);
    let second = Rc::clone(&counter);
    let producers: Vec<Box<dyn ActionProducer>> = vec![
        Box::new(producer_fn(move || {
            let counter = Rc::clone(&first);
            async move {
                counter.set(counter.get() + 1);
                Ok(Vec::new())
            }
        })),
        Box::new(producer_fn(move || {
            let counter = Rc::clone(&second);
            let count = ParamValue::from(counter.get() * 10);
            async move {
                encode_action(
                    &ForwarderConfig::new(Address::repeat_byte(0x5a)).resolver(),
                    TOKEN,
                    "setCount(uint256)",
                    vec![count],
                )
                .produce()
                .await
            }
        })),
    ];

    let plan = block_on_with_spin(encode(&config, &producers)).expect("plan");
    let script = embedded_script(&plan.main_action.data);
    let (_, entries) = decode_call_script(&script).expect("script");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        U256::from_be_slice(&entries[0].data[4..36]),
        U256::from(10u64)
    );
}

#[test]
fn forward_with_only_empty_producers_is_rejected_without_submitting() {
    let config = config();
    let chain = ChainLog::default();
    let producers: Vec<Box<dyn ActionProducer>> = vec![Box::new(Vec::<Action>::new())];
    let err = block_on_with_spin(forward(&config, &chain, &producers, &TxOptions::default()))
        .expect_err("empty forward must fail");
    assert_eq!(err, ForwardError::NoActions);
    assert!(chain.submitted.borrow().is_empty());
}

#[test]
fn coercion_errors_surface_before_any_submission() {
    let config = config();
    let chain = ChainLog::default();
    let producers: Vec<Box<dyn ActionProducer>> = vec![Box::new(encode_action(
        &config.resolver(),
        TOKEN,
        "setPaused(bool)",
        vec!["yes".into()],
    ))];
    let err = block_on_with_spin(forward(&config, &chain, &producers, &TxOptions::default()))
        .expect_err("bad boolean must fail");
    assert!(err.is_coercion_error(), "{err:?}");
    assert!(chain.submitted.borrow().is_empty());
}
