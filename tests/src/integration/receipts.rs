//! # Call Receipts
//!
//! A contract on the root calls a handler in the child. The child answers
//! with a `Result` envelope that travels back in the next checkpoint and
//! refunds the value when the call failed.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_03_cross_msg::{ApplyOutcome, HandlerError, MessageHandler};
    use shared_types::{IpcAddress, IpcEnvelope, IpcMsgKind, OutcomeType};
    use std::sync::Arc;

    const CALLER: u8 = 10;
    const CALLEE: u8 = 20;

    fn call(h: &Hierarchy, value: u64) -> IpcEnvelope {
        IpcEnvelope {
            kind: IpcMsgKind::Call,
            to: IpcAddress::new(h.subnet.clone(), addr(CALLEE)),
            from: IpcAddress::new(root_id(), addr(CALLER)),
            value: amt(value),
            message: b"ping".to_vec(),
            nonce: 0,
        }
    }

    /// Send a call worth `value` and relay it into the child.
    fn deliver(h: &Hierarchy, value: u64) -> ApplyOutcome {
        h.root.mint(addr(CALLER), amt(value)).unwrap();
        h.root.send_contract_xnet_message(call(h, value), 1).unwrap();
        let mut outcomes = h.relay_top_down(2).unwrap();
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    fn receipt_of(outcome: &ApplyOutcome) -> IpcEnvelope {
        match outcome {
            ApplyOutcome::Executed {
                receipt: Some(receipt),
                ..
            } => receipt.clone(),
            other => panic!("no receipt in {other:?}"),
        }
    }

    // =========================================================================
    // SUCCESSFUL CALL
    // =========================================================================

    #[test]
    fn test_successful_call_pays_callee() {
        let h = Hierarchy::bootstrapped(&[100]);
        let callee = RecordingHandler::accepting();
        h.child.register_handler(addr(CALLEE), callee.clone());

        let outcome = deliver(&h, 10);
        assert!(matches!(
            outcome,
            ApplyOutcome::Executed { success: true, .. }
        ));
        assert_eq!(callee.received().len(), 1);
        assert_eq!(callee.received()[0].message, b"ping".to_vec());
        assert_eq!(h.child_balance(&addr(CALLEE)), amt(10));

        let receipt = receipt_of(&outcome);
        assert_eq!(receipt.kind, IpcMsgKind::Result);
        assert!(receipt.value.is_zero());
        let result = receipt.result_msg().unwrap();
        assert_eq!(result.outcome, OutcomeType::Ok);
        assert_eq!(result.ret, b"pong".to_vec());
    }

    #[test]
    fn test_ok_receipt_reaches_caller() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.child
            .register_handler(addr(CALLEE), RecordingHandler::accepting());
        let caller = RecordingHandler::accepting();
        h.root.register_handler(addr(CALLER), caller.clone());
        let sent = call(&h, 10);

        deliver(&h, 10);
        let outcomes = h.settle_checkpoint(10).unwrap();
        assert_eq!(outcomes.len(), 1);

        let received = caller.received();
        assert_eq!(received.len(), 1);
        let result = received[0].result_msg().unwrap();
        assert_eq!(result.outcome, OutcomeType::Ok);
        assert_eq!(result.id, sent.to_hash().unwrap());
        assert_eq!(h.root_balance(&addr(CALLER)), amt(0));
        assert_eq!(h.circ_supply(), amt(10));
    }

    // =========================================================================
    // FAILED CALL
    // =========================================================================

    #[test]
    fn test_reverted_call_refunds_caller() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.child
            .register_handler(addr(CALLEE), RecordingHandler::reverting());
        h.root
            .register_handler(addr(CALLER), RecordingHandler::accepting());

        let outcome = deliver(&h, 10);
        assert!(matches!(
            outcome,
            ApplyOutcome::Executed { success: false, .. }
        ));
        assert_eq!(h.child_balance(&addr(CALLEE)), amt(0));

        let receipt = receipt_of(&outcome);
        assert_eq!(receipt.value, amt(10));
        let result = receipt.result_msg().unwrap();
        assert_eq!(result.outcome, OutcomeType::ActorErr);
        assert_eq!(result.ret, b"nope".to_vec());

        h.settle_checkpoint(10).unwrap();
        assert_eq!(h.root_balance(&addr(CALLER)), amt(10));
        assert!(h.circ_supply().is_zero());
    }

    #[test]
    fn test_missing_handler_refunds_caller() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.root
            .register_handler(addr(CALLER), RecordingHandler::accepting());

        let outcome = deliver(&h, 7);
        let result = receipt_of(&outcome).result_msg().unwrap();
        assert_eq!(result.outcome, OutcomeType::ActorErr);

        h.settle_checkpoint(10).unwrap();
        assert_eq!(h.root_balance(&addr(CALLER)), amt(7));
    }

    struct Panicking;

    impl MessageHandler for Panicking {
        fn handle_ipc_message(&self, _: &IpcEnvelope) -> Result<Vec<u8>, HandlerError> {
            panic!("handler blew up");
        }
    }

    #[test]
    fn test_panicking_handler_becomes_actor_error() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.child.register_handler(addr(CALLEE), Arc::new(Panicking));

        let outcome = deliver(&h, 5);
        assert!(matches!(
            outcome,
            ApplyOutcome::Executed { success: false, .. }
        ));
        let receipt = receipt_of(&outcome);
        assert_eq!(receipt.value, amt(5));
        assert_eq!(
            receipt.result_msg().unwrap().outcome,
            OutcomeType::ActorErr
        );

        // The child keeps working after the panic
        assert!(h.child.take_events().is_ok());
    }

    // =========================================================================
    // RESULTS
    // =========================================================================

    #[test]
    fn test_results_are_never_answered() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.child
            .register_handler(addr(CALLEE), RecordingHandler::reverting());

        deliver(&h, 3);
        // No handler for the caller on the root
        let outcomes = h.settle_checkpoint(10).unwrap();
        assert!(matches!(
            outcomes[0],
            ApplyOutcome::Executed {
                success: false,
                receipt: None,
                ..
            }
        ));
        assert!(h
            .root
            .with_state(|state| state.router().top_down_msgs(&h.subnet, 1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_call_from_foreign_sender_rejected() {
        let h = Hierarchy::bootstrapped(&[100]);
        let mut envelope = call(&h, 0);
        envelope.from = IpcAddress::new(child_id(), addr(CALLER));

        assert!(h.root.send_contract_xnet_message(envelope, 1).is_err());
        assert!(h
            .root
            .with_state(|state| state.router().top_down_msgs(&h.subnet, 0))
            .unwrap()
            .is_empty());
    }
}
