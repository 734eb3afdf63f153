//! # Staking Lifecycle
//!
//! Validators join a child subnet on the root, bootstrap it, and later
//! changes wait for a checkpoint to confirm them.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ipc_01_staking::{PermissionMode, StakingError, StakingEvent};
    use ipc_gateway::{GatewayConfig, GatewayError, GatewayEvent};

    fn is_active(h: &Hierarchy, validator: &shared_types::Address) -> bool {
        h.root
            .with_state(|state| {
                state
                    .actor(&h.subnet)
                    .unwrap()
                    .staking()
                    .validators()
                    .is_active(validator)
            })
            .unwrap()
    }

    fn stake(h: &Hierarchy) -> shared_types::TokenAmount {
        h.root
            .with_state(|state| state.actor(&h.subnet).unwrap().stake())
            .unwrap()
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    #[test]
    fn test_bootstrap_applies_deposits_immediately() {
        let mut h = Hierarchy::new();
        let (v1, n1) = h.join(60).unwrap();
        assert_eq!(n1, None);
        assert!(is_active(&h, &v1));

        let (_, n2) = h.join(40).unwrap();
        assert_eq!(n2, None);
        assert_eq!(stake(&h), amt(100));

        let events = h.root.take_events().unwrap();
        assert!(events.contains(&GatewayEvent::SubnetBootstrapped {
            subnet: h.subnet.clone()
        }));
        assert_eq!(
            h.root
                .with_state(|state| state.router().subnet(&h.subnet).unwrap().stake)
                .unwrap(),
            amt(100)
        );
    }

    #[test]
    fn test_checkpoint_before_bootstrap_rejected() {
        let mut h = Hierarchy::new();
        h.join(30).unwrap();
        let certified = h.certify_checkpoint(10);
        assert_eq!(
            h.root.submit_checkpoint(
                certified.object,
                &certified.signers,
                &certified.signatures,
                11
            ),
            Err(GatewayError::NotBootstrapped {
                subnet: h.subnet.clone()
            })
        );
    }

    // =========================================================================
    // DEFERRED CHANGES
    // =========================================================================

    #[test]
    fn test_changes_confirmed_by_checkpoint() {
        let mut h = Hierarchy::bootstrapped(&[60, 40]);
        let v2 = h.validator(2);

        let (v3, n3) = h.join(50).unwrap();
        assert_eq!(n3, Some(1));
        assert!(!is_active(&h, &v3));

        assert_eq!(h.root.withdraw(&h.subnet, v2, amt(40), 5).unwrap(), Some(2));
        assert!(is_active(&h, &v2));
        assert_eq!(h.next_configuration_number(), 3);

        h.settle_checkpoint(10).unwrap();

        assert!(is_active(&h, &v3));
        assert!(!is_active(&h, &v2));
        assert_eq!(stake(&h), amt(110));
        assert_eq!(h.membership().len(), 2);

        let events = h.root.take_events().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GatewayEvent::Staking {
                event: StakingEvent::ConfigurationNumberConfirmed {
                    configuration_number: 2
                },
                ..
            }
        )));
    }

    #[test]
    fn test_withdrawn_collateral_claimable_after_lock() {
        let h = Hierarchy::bootstrapped(&[60, 40]);
        let v2 = h.validator(2);
        h.root.withdraw(&h.subnet, v2, amt(40), 5).unwrap();
        h.settle_checkpoint(10).unwrap();

        // Confirmed at height 11, locked for 10 blocks
        assert_eq!(h.root.claim(&h.subnet, v2, 15).unwrap(), amt(0));
        assert_eq!(h.root_balance(&v2), amt(0));
        assert_eq!(h.root.claim(&h.subnet, v2, 21).unwrap(), amt(40));
        assert_eq!(h.root_balance(&v2), amt(40));

        assert_eq!(
            h.root.claim(&h.subnet, v2, 30),
            Err(GatewayError::Staking(StakingError::NothingToClaim {
                validator: v2
            }))
        );
    }

    #[test]
    fn test_newcomer_replaces_weakest_active() {
        let mut h = Hierarchy::bootstrapped(&[40, 30, 30]);
        let (v4, _) = h.join(35).unwrap();
        h.root.take_events().unwrap();

        h.settle_checkpoint(10).unwrap();

        assert!(is_active(&h, &v4));
        let events = h.root.take_events().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GatewayEvent::Staking {
                event: StakingEvent::ActiveValidatorReplaced { new_validator, .. },
                ..
            } if *new_validator == v4
        )));
        let waiting = h
            .root
            .with_state(|state| {
                state
                    .actor(&h.subnet)
                    .unwrap()
                    .staking()
                    .validators()
                    .waiting_count()
            })
            .unwrap();
        assert_eq!(waiting, 1);
    }

    #[test]
    fn test_metadata_change_is_deferred() {
        let h = Hierarchy::bootstrapped(&[100]);
        let v1 = h.validator(1);
        assert_eq!(
            h.root.set_metadata(&h.subnet, v1, b"node-1".to_vec()).unwrap(),
            1
        );
        h.settle_checkpoint(10).unwrap();
        let metadata = h
            .root
            .with_state(|state| {
                state
                    .actor(&h.subnet)
                    .unwrap()
                    .staking()
                    .validators()
                    .validator(&v1)
                    .map(|record| record.metadata.clone())
            })
            .unwrap();
        assert_eq!(metadata, Some(b"node-1".to_vec()));
    }

    // =========================================================================
    // FEDERATED
    // =========================================================================

    #[test]
    fn test_federated_subnet_bootstraps_on_power() {
        let mut root = GatewayConfig::for_testing(root_id());
        root.staking.permission_mode = PermissionMode::Federated;
        let h = Hierarchy::with_configs(root, GatewayConfig::for_testing(child_id()));

        let validator = validator_key(1).address();
        assert_eq!(
            h.root
                .set_federated_power(&h.subnet, validator, vec![], shared_types::U256::from(7))
                .unwrap(),
            None
        );
        assert!(h
            .root
            .take_events()
            .unwrap()
            .contains(&GatewayEvent::SubnetBootstrapped {
                subnet: h.subnet.clone()
            }));
        assert!(matches!(
            h.root.deposit(&h.subnet, validator, amt(1)),
            Err(GatewayError::Supply(_)) | Err(GatewayError::Staking(_))
        ));
    }
}
