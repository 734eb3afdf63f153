//! # Command Table
//!
//! Every gateway operation addressable by name. Commands decode from JSON
//! tagged by `op`:
//!
//! ```json
//! {"op": "deposit", "subnet": "/r1/0x..", "validator": [..], "amount": "0x64"}
//! ```
//!
//! and dispatch to the matching [`Gateway`] method.

use ipc_03_cross_msg::{ApplyOutcome, Committed, SupplyKind};
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, BottomUpCheckpoint, BottomUpMsgBatch, ChainEpoch, EncodingError, Hash, IpcEnvelope,
    QuorumObjKind, SubnetId, TokenAmount, U256,
};
use tracing::debug;

use crate::config::subnet_str;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;

/// A gateway operation and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    // ═══════════════════════════════════════════════════════════════════════
    // REGISTRY
    // ═══════════════════════════════════════════════════════════════════════
    Mint {
        owner: Address,
        amount: TokenAmount,
    },
    MintToken {
        token: Address,
        owner: Address,
        amount: TokenAmount,
    },
    RegisterSubnet {
        actor: Address,
        #[serde(default)]
        supply_source: SupplyKind,
    },
    KillSubnet {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // STAKING
    // ═══════════════════════════════════════════════════════════════════════
    Deposit {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        validator: Address,
        amount: TokenAmount,
    },
    Withdraw {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        validator: Address,
        amount: TokenAmount,
    },
    SetMetadata {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        validator: Address,
        metadata: Vec<u8>,
    },
    SetFederatedPower {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        validator: Address,
        #[serde(default)]
        metadata: Vec<u8>,
        power: U256,
    },
    ConfirmChange {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        configuration_number: u64,
    },
    Claim {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        validator: Address,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // CHECKPOINTING
    // ═══════════════════════════════════════════════════════════════════════
    SubmitCheckpoint {
        checkpoint: BottomUpCheckpoint,
        signers: Vec<Address>,
        signatures: Vec<Vec<u8>>,
    },
    SubmitBottomUpMsgBatch {
        batch: BottomUpMsgBatch,
        signers: Vec<Address>,
        signatures: Vec<Vec<u8>>,
    },
    CreateBottomUpCheckpoint {
        block_height: ChainEpoch,
        block_hash: Hash,
        next_configuration_number: u64,
        membership_root: Hash,
        membership_weight: U256,
    },
    CreateBottomUpBatchQuorum {
        batch_height: ChainEpoch,
        membership_root: Hash,
        membership_weight: U256,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // QUORUM
    // ═══════════════════════════════════════════════════════════════════════
    AddQuorumSignature {
        kind: QuorumObjKind,
        object_height: ChainEpoch,
        membership_proof: Vec<Hash>,
        weight: U256,
        signature: Vec<u8>,
    },
    PruneQuorums {
        kind: QuorumObjKind,
        retention_height: ChainEpoch,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // CROSS-NET MESSAGES
    // ═══════════════════════════════════════════════════════════════════════
    Fund {
        #[serde(with = "subnet_str")]
        subnet: SubnetId,
        from: Address,
        to: Address,
        value: TokenAmount,
    },
    Release {
        from: Address,
        to: Address,
        value: TokenAmount,
    },
    SendContractXnetMessage {
        envelope: IpcEnvelope,
    },
    Propagate {
        id: Hash,
    },
    ApplyTopDownMessages {
        msgs: Vec<IpcEnvelope>,
    },
    ApplyMsg {
        #[serde(with = "subnet_str")]
        arriving_from: SubnetId,
        envelope: IpcEnvelope,
    },
    CommitCrossMessage {
        envelope: IpcEnvelope,
    },
}

impl Command {
    /// Operation name as it appears in the `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::MintToken { .. } => "mint_token",
            Self::RegisterSubnet { .. } => "register_subnet",
            Self::KillSubnet { .. } => "kill_subnet",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::SetMetadata { .. } => "set_metadata",
            Self::SetFederatedPower { .. } => "set_federated_power",
            Self::ConfirmChange { .. } => "confirm_change",
            Self::Claim { .. } => "claim",
            Self::SubmitCheckpoint { .. } => "submit_checkpoint",
            Self::SubmitBottomUpMsgBatch { .. } => "submit_bottom_up_msg_batch",
            Self::CreateBottomUpCheckpoint { .. } => "create_bottom_up_checkpoint",
            Self::CreateBottomUpBatchQuorum { .. } => "create_bottom_up_batch_quorum",
            Self::AddQuorumSignature { .. } => "add_quorum_signature",
            Self::PruneQuorums { .. } => "prune_quorums",
            Self::Fund { .. } => "fund",
            Self::Release { .. } => "release",
            Self::SendContractXnetMessage { .. } => "send_contract_xnet_message",
            Self::Propagate { .. } => "propagate",
            Self::ApplyTopDownMessages { .. } => "apply_top_down_messages",
            Self::ApplyMsg { .. } => "apply_msg",
            Self::CommitCrossMessage { .. } => "commit_cross_message",
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    /// Nothing to report.
    Unit,
    /// A newly registered subnet.
    Subnet(#[serde(with = "subnet_str")] SubnetId),
    /// Configuration number of a deferred change, if one was recorded.
    ConfigurationNumber(Option<u64>),
    /// Amount paid out.
    Amount(TokenAmount),
    /// Signer recovered from a quorum signature.
    Signer(Address),
    /// Checkpoint cut on the local network.
    Checkpoint(BottomUpCheckpoint),
    /// Batch whose quorum was opened.
    Batch(BottomUpMsgBatch),
    /// A committed envelope.
    Committed(Committed),
    /// Outcome of one applied envelope.
    Outcome(ApplyOutcome),
    /// Outcomes of applied envelopes, in order.
    Outcomes(Vec<ApplyOutcome>),
}

impl Gateway {
    /// Run `command` at `current_height`.
    pub fn dispatch(
        &self,
        command: Command,
        current_height: ChainEpoch,
    ) -> GatewayResult<CommandOutput> {
        debug!(op = command.name(), height = current_height, "Dispatching command");
        let output = match command {
            Command::Mint { owner, amount } => {
                self.mint(owner, amount)?;
                CommandOutput::Unit
            }
            Command::MintToken {
                token,
                owner,
                amount,
            } => {
                self.mint_token(token, owner, amount)?;
                CommandOutput::Unit
            }
            Command::RegisterSubnet {
                actor,
                supply_source,
            } => CommandOutput::Subnet(self.register_subnet(actor, supply_source, current_height)?),
            Command::KillSubnet { subnet } => {
                self.kill_subnet(&subnet)?;
                CommandOutput::Unit
            }
            Command::Deposit {
                subnet,
                validator,
                amount,
            } => CommandOutput::ConfigurationNumber(self.deposit(&subnet, validator, amount)?),
            Command::Withdraw {
                subnet,
                validator,
                amount,
            } => CommandOutput::ConfigurationNumber(self.withdraw(
                &subnet,
                validator,
                amount,
                current_height,
            )?),
            Command::SetMetadata {
                subnet,
                validator,
                metadata,
            } => CommandOutput::ConfigurationNumber(Some(self.set_metadata(
                &subnet, validator, metadata,
            )?)),
            Command::SetFederatedPower {
                subnet,
                validator,
                metadata,
                power,
            } => CommandOutput::ConfigurationNumber(self.set_federated_power(
                &subnet, validator, metadata, power,
            )?),
            Command::ConfirmChange {
                subnet,
                configuration_number,
            } => {
                self.confirm_change(&subnet, configuration_number, current_height)?;
                CommandOutput::Unit
            }
            Command::Claim { subnet, validator } => {
                CommandOutput::Amount(self.claim(&subnet, validator, current_height)?)
            }
            Command::SubmitCheckpoint {
                checkpoint,
                signers,
                signatures,
            } => CommandOutput::Outcomes(self.submit_checkpoint(
                checkpoint,
                &signers,
                &signatures,
                current_height,
            )?),
            Command::SubmitBottomUpMsgBatch {
                batch,
                signers,
                signatures,
            } => CommandOutput::Outcomes(self.submit_bottom_up_msg_batch(
                batch,
                &signers,
                &signatures,
                current_height,
            )?),
            Command::CreateBottomUpCheckpoint {
                block_height,
                block_hash,
                next_configuration_number,
                membership_root,
                membership_weight,
            } => CommandOutput::Checkpoint(self.create_bottom_up_checkpoint(
                block_height,
                block_hash,
                next_configuration_number,
                membership_root,
                membership_weight,
            )?),
            Command::CreateBottomUpBatchQuorum {
                batch_height,
                membership_root,
                membership_weight,
            } => CommandOutput::Batch(self.create_bottom_up_batch_quorum(
                batch_height,
                membership_root,
                membership_weight,
            )?),
            Command::AddQuorumSignature {
                kind,
                object_height,
                membership_proof,
                weight,
                signature,
            } => CommandOutput::Signer(self.add_quorum_signature(
                kind,
                object_height,
                &membership_proof,
                weight,
                &signature,
            )?),
            Command::PruneQuorums {
                kind,
                retention_height,
            } => {
                self.prune_quorums(kind, retention_height)?;
                CommandOutput::Unit
            }
            Command::Fund {
                subnet,
                from,
                to,
                value,
            } => CommandOutput::Committed(self.fund(&subnet, from, to, value, current_height)?),
            Command::Release { from, to, value } => {
                CommandOutput::Committed(self.release(from, to, value, current_height)?)
            }
            Command::SendContractXnetMessage { envelope } => {
                CommandOutput::Committed(self.send_contract_xnet_message(envelope, current_height)?)
            }
            Command::Propagate { id } => {
                CommandOutput::Committed(self.propagate(&id, current_height)?)
            }
            Command::ApplyTopDownMessages { msgs } => {
                CommandOutput::Outcomes(self.apply_top_down_messages(msgs, current_height)?)
            }
            Command::ApplyMsg {
                arriving_from,
                envelope,
            } => CommandOutput::Outcome(self.apply_msg(&arriving_from, envelope, current_height)?),
            Command::CommitCrossMessage { envelope } => {
                CommandOutput::Committed(self.commit_cross_message(envelope, current_height)?)
            }
        };
        Ok(output)
    }

    /// Decode a JSON command, run it and encode its output.
    pub fn dispatch_json(&self, json: &str, current_height: ChainEpoch) -> GatewayResult<String> {
        let command: Command =
            serde_json::from_str(json).map_err(|e| GatewayError::InvalidCommand(e.to_string()))?;
        let output = self.dispatch(command, current_height)?;
        serde_json::to_string(&output)
            .map_err(|e| GatewayError::Encoding(EncodingError::Serialization(e.to_string())))
    }
}
