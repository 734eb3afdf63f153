//! # Top-Down Funding
//!
//! Value escrowed on the root is committed for the child and minted there
//! once the relayer applies the message.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_03_cross_msg::{ApplyOutcome, IpcMsgType, RouterEvent};
    use ipc_gateway::{GatewayError, GatewayEvent};
    use shared_types::{InvalidXnetMessageReason, SubnetId};

    // =========================================================================
    // FUNDING
    // =========================================================================

    #[test]
    fn test_fund_reaches_child() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.root.mint(addr(1), amt(100)).unwrap();

        let committed = h.root.fund(&h.subnet, addr(1), addr(2), amt(30), 1).unwrap();
        assert_eq!(committed.direction, IpcMsgType::TopDown);
        assert_eq!(committed.envelope.nonce, 0);
        assert_eq!(h.root_balance(&addr(1)), amt(70));
        assert_eq!(h.circ_supply(), amt(30));

        let outcomes = h.relay_top_down(2).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0],
            ApplyOutcome::Executed { success: true, .. }
        ));
        assert_eq!(h.child_balance(&addr(2)), amt(30));
    }

    #[test]
    fn test_funds_applied_in_nonce_order() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.root.mint(addr(1), amt(100)).unwrap();
        for value in [10, 20, 30] {
            h.root.fund(&h.subnet, addr(1), addr(2), amt(value), 1).unwrap();
        }

        let events = h.root.take_events().unwrap();
        let nonces: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GatewayEvent::Router(RouterEvent::NewTopDownMessage { envelope, .. }) => {
                    Some(envelope.nonce)
                }
                _ => None,
            })
            .collect();
        assert_eq!(nonces, vec![0, 1, 2]);

        assert_eq!(h.relay_top_down(2).unwrap().len(), 3);
        assert_eq!(h.child_balance(&addr(2)), amt(60));
        assert_eq!(
            h.child
                .with_state(|state| state.router().applied_top_down_nonce())
                .unwrap(),
            3
        );

        // Nothing new to relay
        assert!(h.relay_top_down(3).unwrap().is_empty());
    }

    #[test]
    fn test_replayed_top_down_message_refused() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.root.mint(addr(1), amt(50)).unwrap();
        h.root.fund(&h.subnet, addr(1), addr(2), amt(50), 1).unwrap();
        h.relay_top_down(2).unwrap();

        let msgs = h
            .root
            .with_state(|state| state.router().top_down_msgs(&h.subnet, 0))
            .unwrap();
        let outcomes = h.child.apply_top_down_messages(msgs, 3).unwrap();
        assert!(matches!(
            &outcomes[0],
            ApplyOutcome::Rejected {
                reason: InvalidXnetMessageReason::Nonce,
                receipt: Some(_)
            }
        ));
        assert_eq!(h.child_balance(&addr(2)), amt(50));
    }

    // =========================================================================
    // FAILURES
    // =========================================================================

    #[test]
    fn test_fund_unknown_subnet_fails() {
        let h = Hierarchy::bootstrapped(&[100]);
        h.root.mint(addr(1), amt(10)).unwrap();
        let stranger = SubnetId::child_of(&root_id(), addr(77));

        assert!(matches!(
            h.root.fund(&stranger, addr(1), addr(2), amt(10), 1),
            Err(GatewayError::Router(_))
        ));
        assert_eq!(h.root_balance(&addr(1)), amt(10));
    }

    #[test]
    fn test_fund_without_balance_changes_nothing() {
        let h = Hierarchy::bootstrapped(&[100]);
        assert!(matches!(
            h.root.fund(&h.subnet, addr(1), addr(2), amt(10), 1),
            Err(GatewayError::Router(_)) | Err(GatewayError::Supply(_))
        ));
        assert!(h.circ_supply().is_zero());
        assert!(h.relay_top_down(2).unwrap().is_empty());
    }
}
