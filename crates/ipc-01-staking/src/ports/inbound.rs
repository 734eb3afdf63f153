//! Driving Ports (API - Inbound)

use shared_types::{Address, ChainEpoch, TokenAmount, U256};

use crate::error::StakingResult;

/// Primary staking API.
///
/// Request operations record a deferred change and return its
/// configuration number; nothing touches the queues until
/// [`StakingApi::confirm_change`].
pub trait StakingApi {
    /// Add collateral for `validator`.
    fn deposit(&mut self, validator: Address, amount: TokenAmount) -> StakingResult<u64>;

    /// Remove collateral from `validator`.
    fn withdraw(&mut self, validator: Address, amount: TokenAmount) -> StakingResult<u64>;

    /// Replace the metadata of `validator`.
    fn set_metadata(&mut self, validator: Address, metadata: Vec<u8>) -> StakingResult<u64>;

    /// Assign federated power to `validator`.
    fn set_federated_power(
        &mut self,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> StakingResult<u64>;

    /// Apply every pending change up to and including `configuration_number`.
    fn confirm_change(
        &mut self,
        configuration_number: u64,
        current_height: ChainEpoch,
    ) -> StakingResult<()>;

    /// Drain the matured releases of `validator`.
    fn claim(&mut self, validator: Address, current_height: ChainEpoch)
        -> StakingResult<TokenAmount>;
}
