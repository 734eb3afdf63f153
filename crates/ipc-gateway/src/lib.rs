//! # ipc-gateway
//!
//! Gateway of one network in the subnet hierarchy.
//!
//! ## Overview
//!
//! - **Parent side**: one [`SubnetActor`] per registered child holds its
//!   validator set; certified checkpoints and batches of the child settle
//!   bottom-up messages and confirm pending validator changes
//! - **Child side**: bottom-up checkpoints are cut locally and certified by
//!   collecting member signatures
//! - **Routing**: funding, releases and contract calls go through the
//!   cross-net router against in-memory supply ledgers
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── Gateway ─────────────────────────────┐
//! │ ReentrantMutex<RefCell<GatewayState>> + per-surface guards       │
//! │                                                                  │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌─────────────────────┐  │
//! │  │ SubnetActor │  │ CertifierService │  │   MessageRouter     │  │
//! │  │ (staking)   │  │ (quorum)         │  │   (cross-msg)       │  │
//! │  └─────────────┘  └──────────────────┘  └──────────┬──────────┘  │
//! │                                                    │             │
//! │                           Ledgers ◄── GatewayEnv ──┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ipc_gateway::{Gateway, GatewayConfig};
//!
//! let gateway = Gateway::new(GatewayConfig::load("gateway.toml")?)?;
//! let subnet = gateway.register_subnet(actor, SupplyKind::Native, height)?;
//! gateway.deposit(&subnet, validator, collateral)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod guard;
pub mod state;

pub use adapters::{GatewayEnv, Ledgers, NativeLedger, TokenLedger};
pub use commands::{Command, CommandOutput};
pub use config::{ConfigError, GatewayConfig};
pub use error::{GatewayError, GatewayResult};
pub use events::GatewayEvent;
pub use gateway::Gateway;
pub use guard::{GuardScope, ReentrancyGuard};
pub use state::{GatewayState, SubnetActor};

use ipc_telemetry::{init_telemetry, TelemetryConfig, TelemetryError, TelemetryGuard};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install logging for a gateway serving `config.network`.
pub fn init_gateway_telemetry(config: &GatewayConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_telemetry(TelemetryConfig::from_env("gateway", config.network.to_string()))
}
