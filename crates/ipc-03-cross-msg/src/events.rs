//! Events emitted by the router.

use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, Hash, IpcEnvelope, SubnetId};

/// Routing progress observable by relayers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterEvent {
    /// Envelope committed towards a child subnet.
    NewTopDownMessage {
        subnet: SubnetId,
        envelope: IpcEnvelope,
        id: Hash,
    },
    /// A full bottom-up batch was cut and awaits signatures.
    NewBottomUpMsgBatch { height: ChainEpoch },
    /// Envelope parked in the postbox for forwarding.
    QueuedForPropagation { id: Hash },
    /// Postbox entry forwarded.
    MessagePropagated { id: Hash },
    /// Child subnet registered.
    SubnetRegistered { subnet: SubnetId },
    /// Child subnet removed.
    SubnetKilled { subnet: SubnetId },
}
