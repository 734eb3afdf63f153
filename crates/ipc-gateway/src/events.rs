//! Events emitted by the gateway.

use ipc_01_staking::StakingEvent;
use ipc_02_quorum::QuorumEvent;
use ipc_03_cross_msg::RouterEvent;
use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, SubnetId};

/// Everything observable after a committed operation, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// Validator set change of a child subnet.
    Staking {
        subnet: SubnetId,
        event: StakingEvent,
    },
    /// Certification progress on the local network.
    Quorum(QuorumEvent),
    /// Routing progress on the local network.
    Router(RouterEvent),
    /// A child subnet's validators reached the bootstrap collateral.
    SubnetBootstrapped { subnet: SubnetId },
    /// A checkpoint of a child was accepted.
    CheckpointSubmitted {
        subnet: SubnetId,
        height: ChainEpoch,
        next_configuration_number: u64,
    },
    /// A size-triggered batch of a child was accepted.
    BottomUpBatchSubmitted { subnet: SubnetId, height: ChainEpoch },
}
