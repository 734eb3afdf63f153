//! # Cross-Net Envelopes
//!
//! The envelope carried between subnets, its kinds, and the result payload
//! a receipt carries back to the sender.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::errors::EncodingError;
use crate::primitives::{Address, Hash, TokenAmount};
use crate::subnet_id::SubnetId;

/// A raw address qualified by the subnet it lives in.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IpcAddress {
    /// Subnet the address belongs to.
    pub subnet: SubnetId,
    /// Address inside that subnet.
    pub raw: Address,
}

impl IpcAddress {
    /// Creates an IPC address.
    #[must_use]
    pub fn new(subnet: SubnetId, raw: Address) -> Self {
        Self { subnet, raw }
    }
}

impl fmt::Debug for IpcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subnet, self.raw)
    }
}

impl fmt::Display for IpcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subnet, self.raw)
    }
}

/// What an envelope asks the destination to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpcMsgKind {
    /// Moves value only.
    Transfer,
    /// Calls the destination's message handler.
    Call,
    /// Carries the outcome of an earlier `Call` back to its sender.
    Result,
}

/// Outcome recorded in a result message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeType {
    /// Executed successfully.
    Ok,
    /// Rejected by the router before execution.
    SystemErr,
    /// The destination handler failed.
    ActorErr,
}

/// Reasons a router rejects an envelope before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidXnetMessageReason {
    /// The sender is not allowed to send it.
    Sender,
    /// Destination subnet is missing or malformed.
    DstSubnet,
    /// Nonce did not match the expected one.
    Nonce,
    /// Value is inconsistent with the kind.
    Value,
    /// Kind is not allowed on this path.
    Kind,
    /// Sent to the local network.
    CannotSendToItself,
    /// Source and destination share no ancestor.
    CommonParentNotExist,
}

/// Payload of a `Result` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMsg {
    /// Hash of the envelope this result answers.
    pub id: Hash,
    /// How execution went.
    pub outcome: OutcomeType,
    /// Return data or encoded error.
    pub ret: Vec<u8>,
}

/// A cross-net message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcEnvelope {
    /// Kind of message.
    pub kind: IpcMsgKind,
    /// Destination.
    pub to: IpcAddress,
    /// Sender.
    pub from: IpcAddress,
    /// Value carried by the message.
    pub value: TokenAmount,
    /// Opaque payload.
    pub message: Vec<u8>,
    /// Assigned by the committing router.
    pub nonce: u64,
}

impl IpcEnvelope {
    /// Top-down transfer from `from` in the parent of `subnet` to `to` inside it.
    #[must_use]
    pub fn new_fund(subnet: &SubnetId, from: Address, to: Address, value: TokenAmount) -> Option<Self> {
        let parent = subnet.parent()?;
        Some(Self {
            kind: IpcMsgKind::Transfer,
            to: IpcAddress::new(subnet.clone(), to),
            from: IpcAddress::new(parent, from),
            value,
            message: Vec::new(),
            nonce: 0,
        })
    }

    /// Bottom-up transfer from `from` inside `subnet` to `to` in its parent.
    #[must_use]
    pub fn new_release(
        subnet: &SubnetId,
        from: Address,
        to: Address,
        value: TokenAmount,
    ) -> Option<Self> {
        let parent = subnet.parent()?;
        Some(Self {
            kind: IpcMsgKind::Transfer,
            to: IpcAddress::new(parent, to),
            from: IpcAddress::new(subnet.clone(), from),
            value,
            message: Vec::new(),
            nonce: 0,
        })
    }

    /// Result envelope answering `self`, travelling the opposite way.
    ///
    /// Value is returned to the sender unless execution succeeded.
    pub fn new_result(
        &self,
        outcome: OutcomeType,
        ret: Vec<u8>,
    ) -> Result<Self, EncodingError> {
        let result = ResultMsg {
            id: self.to_hash()?,
            outcome,
            ret,
        };
        let value = if outcome == OutcomeType::Ok {
            TokenAmount::zero()
        } else {
            self.value
        };
        Ok(Self {
            kind: IpcMsgKind::Result,
            to: self.from.clone(),
            from: self.to.clone(),
            value,
            message: encode(&result)?,
            nonce: 0,
        })
    }

    /// Decodes the payload of a `Result` envelope.
    pub fn result_msg(&self) -> Result<ResultMsg, EncodingError> {
        bincode::deserialize(&self.message).map_err(|e| EncodingError::Serialization(e.to_string()))
    }

    /// Content hash used as postbox key and result id.
    pub fn to_hash(&self) -> Result<Hash, EncodingError> {
        let bytes = encode(self)?;
        Ok(Hash(Keccak256::digest(bytes).into()))
    }
}

/// Encodes `value` with the canonical binary encoding.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, EncodingError> {
    bincode::serialize(value).map_err(|e| EncodingError::Serialization(e.to_string()))
}

/// Whether envelope nonces strictly increase. Informational only.
#[must_use]
pub fn is_sorted_by_nonce(msgs: &[IpcEnvelope]) -> bool {
    msgs.windows(2).all(|pair| pair[0].nonce < pair[1].nonce)
}
