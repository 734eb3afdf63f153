//! Certifier configuration.

use serde::{Deserialize, Serialize};

use crate::error::{QuorumError, QuorumResult};

/// Quorum parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    /// Share of membership weight, in percent, that certifies an object.
    pub majority_percentage: u8,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            majority_percentage: 67,
        }
    }
}

impl QuorumConfig {
    /// Same as default.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Majority must be a real majority.
    pub fn validate(&self) -> QuorumResult<()> {
        if !(51..=100).contains(&self.majority_percentage) {
            return Err(QuorumError::InvalidMajorityPercentage {
                percentage: self.majority_percentage,
            });
        }
        Ok(())
    }
}
