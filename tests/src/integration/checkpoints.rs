//! # Checkpoint Certification and Settlement
//!
//! The child cuts a checkpoint, its validators sign it through the quorum
//! certifier, and the root verifies the signatures against the validator
//! set it keeps for the child before settling the messages.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_02_quorum::{MultisigError, QuorumEvent};
    use ipc_gateway::{GatewayError, GatewayEvent};
    use shared_types::{QuorumObjKind, U256};

    // =========================================================================
    // CERTIFICATION (child side)
    // =========================================================================

    #[test]
    fn test_quorum_reached_once_per_checkpoint() {
        let h = Hierarchy::bootstrapped(&[40, 30, 30]);
        h.child.take_events().unwrap();

        let certified = h.certify_checkpoint(10);
        assert_eq!(certified.signers.len(), 3);

        let info = h
            .child
            .quorum_info(QuorumObjKind::Checkpoint, 10)
            .unwrap()
            .unwrap();
        assert!(info.reached);
        assert_eq!(info.current_weight, U256::from(100));
        assert_eq!(info.object_hash, certified.object.to_hash().unwrap());

        let events = h.child.take_events().unwrap();
        let reached = events
            .iter()
            .filter(|e| matches!(e, GatewayEvent::Quorum(QuorumEvent::QuorumReached { .. })))
            .count();
        assert_eq!(reached, 1);
    }

    #[test]
    fn test_checkpoint_only_at_period_boundary() {
        let h = Hierarchy::bootstrapped(&[100]);
        assert_eq!(
            h.child
                .create_bottom_up_checkpoint(5, block_hash(5), 1, block_hash(0), U256::one()),
            Err(GatewayError::NotCheckpointHeight {
                height: 5,
                period: 10
            })
        );
    }

    // =========================================================================
    // SETTLEMENT (root side)
    // =========================================================================

    #[test]
    fn test_sequential_checkpoints_settle() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        h.settle_checkpoint(10).unwrap();
        h.settle_checkpoint(20).unwrap();

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

        let submitted = h
            .root
            .take_events()
            .unwrap()
            .into_iter()
            .filter(|e| matches!(e, GatewayEvent::CheckpointSubmitted { .. }))
            .count();
        assert_eq!(submitted, 2);
    }

    #[test]
    fn test_skipped_height_rejected() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        let certified = h.certify_checkpoint(20);
        assert_eq!(
            h.root.submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                21
            ),
            Err(GatewayError::InvalidCheckpointHeight {
                expected: 10,
                got: 20
            })
        );
    }

    #[test]
    fn test_replayed_checkpoint_rejected() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        let certified = h.certify_checkpoint(10);
        h.root
            .submit_checkpoint(
                certified.object.clone(),
                &certified.signers,
                &certified.signatures,
                11,
            )
            .unwrap();

        assert_eq!(
            h.root.submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                12
            ),
            Err(GatewayError::InvalidCheckpointHeight {
                expected: 20,
                got: 10
            })
        );
    }

    #[test]
    fn test_minority_signatures_rejected() {
        let h = Hierarchy::bootstrapped(&[40, 30, 30]);
        let minority = [h.validator(2), h.validator(3)];
        let certified = h.certify_checkpoint_by(10, &minority);

        assert_eq!(
            h.root.submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                11
            ),
            Err(GatewayError::Multisig(MultisigError::WeightsBelowThreshold {
                weight: U256::from(60),
                threshold: U256::from(67)
            }))
        );
    }

    #[test]
    fn test_tampered_checkpoint_rejected() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        let mut certified = h.certify_checkpoint(10);
        certified.object.next_configuration_number += 1;

        assert!(matches!(
            h.root.submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                11
            ),
            Err(GatewayError::Multisig(_))
        ));
        let last = h
            .root
            .with_state(|state| {
                state
                    .actor(&h.subnet)
                    .unwrap()
                    .last_bottom_up_checkpoint_height()
            })
            .unwrap();
        assert_eq!(last, 0);
    }

    #[test]
    fn test_duplicate_signer_rejected() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        let certified = h.certify_checkpoint(10);
        let signer = certified.signers[0];
        let signature = certified.signatures[0].clone();

        assert_eq!(
            h.root.submit_checkpoint(
                certified.object,
                &[signer, signer],
                &[signature.clone(), signature],
                11
            ),
            Err(GatewayError::DuplicateSigner { signer })
        );
    }

    #[test]
    fn test_prune_after_settlement() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        h.settle_checkpoint(10).unwrap();
        h.settle_checkpoint(20).unwrap();

        h.child.prune_quorums(QuorumObjKind::Checkpoint, 20).unwrap();
        assert!(h
            .child
            .quorum_info(QuorumObjKind::Checkpoint, 10)
            .unwrap()
            .is_none());
        assert!(h
            .child
            .quorum_info(QuorumObjKind::Checkpoint, 20)
            .unwrap()
            .is_some());
        assert!(h
            .child
            .with_state(|state| state.bottom_up_checkpoint(10).is_none())
            .unwrap());
    }
}
