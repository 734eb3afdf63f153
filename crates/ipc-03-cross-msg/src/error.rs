//! Error types for the message router

use shared_types::{
    ArithmeticError, EncodingError, Hash, InvalidXnetMessageReason, SubnetId,
    TokenAmount,
};
use thiserror::Error;

use crate::ports::outbound::SupplyError;

/// Router errors. Each one aborts the operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Destination subnet is undefined
    #[error("Destination subnet is empty")]
    EmptyDestination,

    /// Destination is the local network
    #[error("Cannot send a cross-net message to the local network")]
    SelfDestination,

    /// Envelope failed validation
    #[error("Invalid cross-net message: {reason:?}")]
    InvalidXnetMessage { reason: InvalidXnetMessageReason },

    /// Child subnet not in the registry
    #[error("Subnet not registered: {subnet}")]
    NotRegisteredSubnet { subnet: SubnetId },

    /// Child subnet registered twice
    #[error("Subnet already registered: {subnet}")]
    AlreadyRegisteredSubnet { subnet: SubnetId },

    /// Subnet still backs circulating value
    #[error("Subnet {subnet} still has {circ_supply} in circulation")]
    SubnetNotEmpty {
        subnet: SubnetId,
        circ_supply: TokenAmount,
    },

    /// Operation disabled by configuration
    #[error("Method not allowed: {reason}")]
    MethodNotAllowed { reason: &'static str },

    /// Local network is a root and has no parent
    #[error("Network {network} has no parent")]
    NoParent { network: SubnetId },

    /// Child released more than it holds
    #[error("Not enough circulating supply: required {required}, available {available}")]
    NotEnoughFunds {
        required: TokenAmount,
        available: TokenAmount,
    },

    /// No postbox entry under the id
    #[error("Postbox entry not found: {id}")]
    PostboxNotFound { id: Hash },

    /// Router parameters out of range
    #[error("Invalid router config: {reason}")]
    InvalidConfig { reason: String },

    /// Supply source refused the value movement
    #[error(transparent)]
    Supply(#[from] SupplyError),

    /// Envelope could not be hashed or encoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Checked arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Result alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
