//! # Reentrancy and Concurrency
//!
//! Handlers run while their gateway holds the state. Calls back into the
//! same gateway fail, calls into another network's gateway go through, and
//! callers on other threads wait their turn.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_03_cross_msg::{ApplyOutcome, HandlerError, MessageHandler};
    use ipc_gateway::{Gateway, GatewayError};
    use parking_lot::Mutex;
    use shared_types::{IpcAddress, IpcEnvelope, IpcMsgKind, OutcomeType};
    use std::sync::{Arc, Weak};
    use std::thread;

    type Reaction = dyn Fn(&Gateway) -> Result<(), GatewayError> + Send + Sync;

    /// Handler that runs `reaction` against a gateway and records the error.
    struct Callback {
        gateway: Weak<Gateway>,
        reaction: Box<Reaction>,
        errors: Mutex<Vec<GatewayError>>,
    }

    impl Callback {
        fn new(
            gateway: &Arc<Gateway>,
            reaction: impl Fn(&Gateway) -> Result<(), GatewayError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                gateway: Arc::downgrade(gateway),
                reaction: Box::new(reaction),
                errors: Mutex::new(Vec::new()),
            })
        }

        fn errors(&self) -> Vec<GatewayError> {
            self.errors.lock().clone()
        }
    }

    impl MessageHandler for Callback {
        fn handle_ipc_message(&self, _: &IpcEnvelope) -> Result<Vec<u8>, HandlerError> {
            let gateway = self
                .gateway
                .upgrade()
                .ok_or_else(|| HandlerError::Rejected("gateway dropped".into()))?;
            match (self.reaction)(&gateway) {
                Ok(()) => Ok(b"ok".to_vec()),
                Err(err) => {
                    self.errors.lock().push(err.clone());
                    Err(HandlerError::Rejected(err.to_string()))
                }
            }
        }
    }

    fn call(h: &Hierarchy) -> IpcEnvelope {
        IpcEnvelope {
            kind: IpcMsgKind::Call,
            to: IpcAddress::new(h.subnet.clone(), addr(20)),
            from: IpcAddress::new(root_id(), addr(10)),
            value: amt(0),
            message: Vec::new(),
            nonce: 0,
        }
    }

    // =========================================================================
    // REENTRANCY
    // =========================================================================

    #[test]
    fn test_handler_cannot_reenter_its_gateway() {
        let h = Hierarchy::bootstrapped(&[100]);
        let handler = Callback::new(&h.child, |gateway| {
            gateway.release(addr(20), addr(1), amt(1), 2).map(|_| ())
        });
        h.child.register_handler(addr(20), handler.clone());

        h.root.send_contract_xnet_message(call(&h), 1).unwrap();
        let outcomes = h.relay_top_down(2).unwrap();

        assert_eq!(
            handler.errors(),
            vec![GatewayError::Reentrancy {
                surface: "cross_msg"
            }]
        );
        let ApplyOutcome::Executed {
            success: false,
            receipt: Some(receipt),
            ..
        } = &outcomes[0]
        else {
            panic!("unexpected outcome {:?}", outcomes[0]);
        };
        assert_eq!(
            receipt.result_msg().unwrap().outcome,
            OutcomeType::ActorErr
        );
        // Only the receipt left the child
        assert_eq!(
            h.child
                .with_state(|state| state.router().bottom_up_nonce())
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_handler_cannot_touch_other_surface() {
        let h = Hierarchy::bootstrapped(&[100]);
        let handler = Callback::new(&h.child, |gateway| gateway.mint(addr(20), amt(5)));
        h.child.register_handler(addr(20), handler.clone());

        h.root.send_contract_xnet_message(call(&h), 1).unwrap();
        h.relay_top_down(2).unwrap();

        assert_eq!(
            handler.errors(),
            vec![GatewayError::Reentrancy {
                surface: "registry"
            }]
        );
        assert_eq!(h.child_balance(&addr(20)), amt(0));
    }

    #[test]
    fn test_result_handler_cannot_resubmit_checkpoint() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.child
            .register_handler(addr(20), RecordingHandler::reverting());
        let certified = h.certify_checkpoint(10);
        let (object, signers, signatures) = (
            certified.object.clone(),
            certified.signers.clone(),
            certified.signatures.clone(),
        );
        let caller = Callback::new(&h.root, move |gateway| {
            gateway
                .submit_checkpoint(object.clone(), &signers, &signatures, 11)
                .map(|_| ())
        });
        h.root.register_handler(addr(10), caller.clone());

        // Empty checkpoint at 10 settles; the receipt rides the one at 20
        h.root
            .submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                11,
            )
            .unwrap();
        h.root.send_contract_xnet_message(call(&h), 12).unwrap();
        h.relay_top_down(13).unwrap();
        h.settle_checkpoint(20).unwrap();

        assert_eq!(
            caller.errors(),
            vec![GatewayError::Reentrancy {
                surface: "checkpointing"
            }]
        );
        let last = h
            .root
            .with_state(|state| {
                state
                    .actor(&h.subnet)
                    .unwrap()
                    .last_bottom_up_checkpoint_height()
            })
            .unwrap();
        assert_eq!(last, 20);
    }

    #[test]
    fn test_handler_may_call_other_network() {
        let h = Hierarchy::bootstrapped(&[100]);
        let handler = Callback::new(&h.root, |root| root.mint(addr(30), amt(9)));
        h.child.register_handler(addr(20), handler.clone());

        h.root.send_contract_xnet_message(call(&h), 1).unwrap();
        let outcomes = h.relay_top_down(2).unwrap();

        assert!(handler.errors().is_empty());
        assert!(matches!(
            outcomes[0],
            ApplyOutcome::Executed { success: true, .. }
        ));
        assert_eq!(h.root_balance(&addr(30)), amt(9));
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[test]
    fn test_concurrent_funders_get_distinct_nonces() {
        let h = Hierarchy::bootstrapped(&[100]);
        for i in 1..=4 {
            h.root.mint(addr(i), amt(10)).unwrap();
        }

        let handles: Vec<_> = (1..=4u8)
            .map(|i| {
                let root = Arc::clone(&h.root);
                let subnet = h.subnet.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        root.fund(&subnet, addr(i), addr(i + 10), amt(2), 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let msgs = h
            .root
            .with_state(|state| state.router().top_down_msgs(&h.subnet, 0))
            .unwrap();
        let nonces: Vec<_> = msgs.iter().map(|m| m.nonce).collect();
        assert_eq!(nonces, (0..20).collect::<Vec<u64>>());
        assert_eq!(h.circ_supply(), amt(40));

        assert_eq!(h.relay_top_down(2).unwrap().len(), 20);
        for i in 1..=4u8 {
            assert_eq!(h.child_balance(&addr(i + 10)), amt(10));
        }
    }
}
