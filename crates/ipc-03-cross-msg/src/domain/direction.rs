//! Message directionality.
//!
//! A message travels up from its source to the lowest common ancestor of
//! `from` and `to`, then down to the destination. Each hop classifies the
//! envelope against its own position in the tree.

use serde::{Deserialize, Serialize};
use shared_types::{IpcEnvelope, SubnetId};

/// Direction an envelope moves at the current hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcMsgType {
    /// Parent to child.
    TopDown,
    /// Child to parent.
    BottomUp,
}

/// Whether a message from `from` to `to` starts by going up.
pub fn is_bottomup(from: &SubnetId, to: &SubnetId) -> bool {
    from.common_prefix_len(to)
        .is_some_and(|common| from.route.len() > common)
}

/// Direction of `envelope` as seen from `current`.
///
/// Bottom-up iff `current` and the message share the same common ancestor
/// with the destination and the sender sits below that ancestor.
pub fn apply_type(envelope: &IpcEnvelope, current: &SubnetId) -> IpcMsgType {
    let from = &envelope.from.subnet;
    let to = &envelope.to.subnet;
    let current_parent = current.common_parent(to);
    let message_parent = from.common_parent(to);

    if current_parent.is_some() && current_parent == message_parent && is_bottomup(from, to) {
        IpcMsgType::BottomUp
    } else {
        IpcMsgType::TopDown
    }
}

/// Whether `current` is the lowest common ancestor of sender and destination.
pub fn is_lca(envelope: &IpcEnvelope, current: &SubnetId) -> bool {
    envelope
        .to
        .subnet
        .common_parent(&envelope.from.subnet)
        .as_ref()
        == Some(current)
}

/// Whether either leg of the route spans more than one hop.
pub fn is_multilevel(from: &SubnetId, to: &SubnetId) -> bool {
    match from.common_prefix_len(to) {
        Some(common) => from.route.len() - common > 1 || to.route.len() - common > 1,
        None => true,
    }
}
