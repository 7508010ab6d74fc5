mod common;

use std::sync::Arc;

use common::{network, rate_limited, ScriptedTransport};
use proptest::prelude::*;
use tg_dispatch::{
    Destination, DispatchError, DispatchableMessage, Dispatcher, RateLimitGate, TransportError,
};

#[derive(Debug, Clone)]
enum Step {
    RateLimited(u64),
    Network,
    Ok,
}

impl Step {
    fn outcome(&self) -> Result<(), TransportError> {
        match self {
            Self::RateLimited(secs) => Err(rate_limited(*secs)),
            Self::Network => Err(network("timed out")),
            Self::Ok => Ok(()),
        }
    }
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..30).prop_map(Step::RateLimited),
        Just(Step::Network),
        Just(Step::Ok),
    ]
}

fn run(script: &[Step]) -> (Result<(), DispatchError>, u32, usize) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to build runtime");

    runtime.block_on(async {
        let transport = Arc::new(ScriptedTransport::new(script.iter().map(Step::outcome)));
        let dispatcher = Dispatcher::new(transport.clone(), Arc::new(RateLimitGate::new()));
        let mut msg = DispatchableMessage::text("prop");
        let res = msg.send(&dispatcher, &Destination::Chat(1)).await;
        (res, msg.retries(), transport.calls().len())
    })
}

proptest! {
    /// The transport is reached at most three times, however failures mix.
    #[test]
    fn never_more_than_three_attempts(script in prop::collection::vec(step(), 0..8)) {
        let (res, retries, calls) = run(&script);
        prop_assert!(calls <= 3, "{} calls for {:?}", calls, script);

        let first_ok = script.iter().position(|s| matches!(s, Step::Ok));
        match res {
            Ok(()) => {
                prop_assert_eq!(retries, 0);
                // Success comes from the first Ok step, or from an exhausted script
                let expected = first_ok.map_or(script.len() + 1, |i| i + 1);
                prop_assert_eq!(calls, expected);
            }
            Err(DispatchError::RetriesExhausted { retries: r }) => {
                prop_assert_eq!(r, 3);
                prop_assert_eq!(retries, 3);
                prop_assert_eq!(calls, 3);
                prop_assert!(first_ok.map_or(true, |i| i >= 3));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
