//! # Bottom-Up Release
//!
//! Value released on the child leaves circulation there and is paid out of
//! the root's custody once a certified checkpoint or batch carries it up.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_03_cross_msg::{ApplyOutcome, IpcMsgType, RouterError, RouterEvent, SupplyError};
    use ipc_gateway::{GatewayError, GatewayEvent};

    /// Child bootstrapped with two validators and `funded` sent to `addr(2)`.
    fn funded(funded: u64) -> Hierarchy {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        h.root.mint(addr(1), amt(funded)).unwrap();
        h.root
            .fund(&h.subnet, addr(1), addr(2), amt(funded), 1)
            .unwrap();
        h.relay_top_down(2).unwrap();
        h
    }

    // =========================================================================
    // CHECKPOINT SETTLEMENT
    // =========================================================================

    #[test]
    fn test_release_settles_with_checkpoint() {
        let h = funded(50);
        let committed = h.child.release(addr(2), addr(3), amt(20), 3).unwrap();
        assert_eq!(committed.direction, IpcMsgType::BottomUp);
        assert!(committed.should_burn);
        assert_eq!(h.child_balance(&addr(2)), amt(30));

        // Nothing moves on the root until the checkpoint lands
        assert_eq!(h.root_balance(&addr(3)), amt(0));

        let outcomes = h.settle_checkpoint(10).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0],
            ApplyOutcome::Executed { success: true, .. }
        ));
        assert_eq!(h.root_balance(&addr(3)), amt(20));
        assert_eq!(h.circ_supply(), amt(30));
    }

    #[test]
    fn test_checkpoint_carries_epoch_messages() {
        let h = funded(50);
        h.child.release(addr(2), addr(3), amt(5), 3).unwrap();
        h.child.release(addr(2), addr(4), amt(5), 7).unwrap();

        let certified = h.certify_checkpoint(10);
        assert_eq!(certified.object.msgs.len(), 2);
        let nonces: Vec<_> = certified.object.msgs.iter().map(|m| m.nonce).collect();
        assert_eq!(nonces, vec![0, 1]);

        // Next checkpoint starts empty
        let next = h.certify_checkpoint(20);
        assert!(next.object.msgs.is_empty());
    }

    #[test]
    fn test_release_without_balance_rejected() {
        let h = funded(10);
        assert_eq!(
            h.child.release(addr(2), addr(3), amt(11), 3),
            Err(GatewayError::Router(RouterError::Supply(
                SupplyError::InsufficientBalance {
                    owner: addr(2),
                    required: amt(11),
                    available: amt(10),
                }
            )))
        );
        assert!(h.certify_checkpoint(10).object.msgs.is_empty());
    }

    #[test]
    fn test_release_beyond_circulating_supply_rejected() {
        let h = funded(10);
        // Value that never came from the root
        h.child.mint(addr(5), amt(100)).unwrap();
        h.child.release(addr(5), addr(3), amt(100), 3).unwrap();

        assert_eq!(
            h.settle_checkpoint(10),
            Err(GatewayError::Router(RouterError::NotEnoughFunds {
                required: amt(100),
                available: amt(10),
            }))
        );
        assert_eq!(h.root_balance(&addr(3)), amt(0));
        assert_eq!(h.circ_supply(), amt(10));
    }

    // =========================================================================
    // SIZE-TRIGGERED BATCHES
    // =========================================================================

    #[test]
    fn test_full_batch_settles_before_checkpoint() {
        let h = funded(50);
        h.child.take_events().unwrap();
        for _ in 0..4 {
            h.child.release(addr(2), addr(3), amt(5), 5).unwrap();
        }
        assert!(h
            .child
            .take_events()
            .unwrap()
            .contains(&GatewayEvent::Router(RouterEvent::NewBottomUpMsgBatch {
                height: 5
            })));

        let certified = h.certify_batch(5);
        assert_eq!(certified.object.msgs.len(), 3);
        let outcomes = h
            .root
            .submit_bottom_up_msg_batch(
                certified.object,
                &certified.signers,
                &certified.signatures,
                6,
            )
            .unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(h.root_balance(&addr(3)), amt(15));

        // The message that overflowed the batch rides the checkpoint
        let outcomes = h.settle_checkpoint(10).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(h.root_balance(&addr(3)), amt(20));
        assert_eq!(h.circ_supply(), amt(30));
    }

    #[test]
    fn test_busy_block_cuts_several_batches() {
        let h = funded(50);
        h.child.take_events().unwrap();
        for _ in 0..9 {
            h.child.release(addr(2), addr(3), amt(5), 5).unwrap();
        }
        let cut: Vec<_> = h
            .child
            .take_events()
            .unwrap()
            .into_iter()
            .filter_map(|event| match event {
                GatewayEvent::Router(RouterEvent::NewBottomUpMsgBatch { height }) => Some(height),
                _ => None,
            })
            .collect();
        assert_eq!(cut, vec![5, 6]);

        for (height, submitted_at) in [(5, 6), (6, 7)] {
            let certified = h.certify_batch(height);
            assert_eq!(certified.object.msgs.len(), 3);
            let outcomes = h
                .root
                .submit_bottom_up_msg_batch(
                    certified.object,
                    &certified.signers,
                    &certified.signatures,
                    submitted_at,
                )
                .unwrap();
            assert_eq!(outcomes.len(), 3);
        }
        assert_eq!(h.root_balance(&addr(3)), amt(30));

        let outcomes = h.settle_checkpoint(10).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(h.root_balance(&addr(3)), amt(45));
        assert_eq!(h.circ_supply(), amt(5));
    }

    #[test]
    fn test_batch_replay_rejected() {
        let h = funded(50);
        for _ in 0..4 {
            h.child.release(addr(2), addr(3), amt(5), 5).unwrap();
        }
        let certified = h.certify_batch(5);
        h.root
            .submit_bottom_up_msg_batch(
                certified.object.clone(),
                &certified.signers,
                &certified.signatures,
                6,
            )
            .unwrap();

        assert_eq!(
            h.root.submit_bottom_up_msg_batch(
                certified.object,
                &certified.signers,
                &certified.signatures,
                7,
            ),
            Err(GatewayError::InvalidBatch {
                height: 5,
                reason: "batch height already submitted",
            })
        );
        assert_eq!(h.root_balance(&addr(3)), amt(15));
    }

    #[test]
    fn test_no_batch_quorum_without_cut() {
        let h = funded(50);
        h.child.release(addr(2), addr(3), amt(5), 5).unwrap();
        assert_eq!(
            h.child
                .create_bottom_up_batch_quorum(5, block_hash(0), shared_types::U256::one()),
            Err(GatewayError::ObjectNotFound {
                kind: "bottom-up batch",
                height: 5,
            })
        );
    }
}
