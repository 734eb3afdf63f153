//! Driving Ports (API - Inbound)

use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, Hash, InvalidXnetMessageReason, IpcEnvelope, SubnetId};

use crate::domain::IpcMsgType;
use crate::error::RouterResult;
use crate::ports::outbound::ExecutionEnv;

/// What happened to an applied envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    /// Unknown sender; nothing recorded.
    Dropped,
    /// Refused before execution; a SystemErr receipt was sent if possible.
    Rejected {
        reason: InvalidXnetMessageReason,
        receipt: Option<IpcEnvelope>,
    },
    /// Parked in the postbox for forwarding.
    Forwarded { id: Hash },
    /// Executed locally.
    Executed {
        success: bool,
        ret: Vec<u8>,
        receipt: Option<IpcEnvelope>,
    },
}

/// A committed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committed {
    /// Envelope with its assigned nonce.
    pub envelope: IpcEnvelope,
    /// Direction it leaves the local network in.
    pub direction: IpcMsgType,
    /// Whether the value must leave local circulation.
    pub should_burn: bool,
}

/// Primary router API.
pub trait CrossMsgApi {
    /// Apply an envelope arriving from `arriving_from`.
    ///
    /// Execution failures and nonce mismatches produce receipts, not errors.
    fn apply_msg(
        &mut self,
        arriving_from: &SubnetId,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<ApplyOutcome>;

    /// Assign a nonce to `envelope` and queue it towards its destination.
    fn commit_cross_message(
        &mut self,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> RouterResult<Committed>;
}
