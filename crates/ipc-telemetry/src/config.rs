//! Log output settings.
//!
//! The owning crate names the component and the network; the operator picks
//! the filter and the output format through `IPC_LOG` and `IPC_LOG_FORMAT`.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// How log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with ANSI colours
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
    /// Filter installed, nothing written
    Off,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "off" | "none" => Ok(Self::Off),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Logging setup for one component serving one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Component tag, e.g. `gateway`
    pub component: String,
    /// Local subnet id
    pub network: String,
    /// `EnvFilter` directive; `RUST_LOG` still wins when set
    pub filter: String,
    /// Output format
    pub format: LogFormat,
}

impl TelemetryConfig {
    /// Settings for `component` on `network` with an `info` filter.
    pub fn new(component: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            network: network.into(),
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }

    /// Like [`TelemetryConfig::new`], then applies `IPC_LOG` and
    /// `IPC_LOG_FORMAT`. An unreadable format keeps the default.
    pub fn from_env(component: impl Into<String>, network: impl Into<String>) -> Self {
        let mut config = Self::new(component, network);
        if let Ok(filter) = env::var("IPC_LOG") {
            config.filter = filter;
        }
        if let Some(format) = env::var("IPC_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.format = format;
        }
        config
    }
}
