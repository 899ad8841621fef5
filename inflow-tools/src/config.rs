//! CLI configuration.

use std::env;

use anyhow::{Context, Result};
use inflow_codec::BridgeConfig;

/// Origin used for pay links when none is configured
pub const DEFAULT_BASE_ORIGIN: &str = "https://inflow.app";

/// CLI configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Origin of the pay page, e.g. `https://inflow.app`.
    pub base_origin: String,
    /// Ethereum-side bridge contracts and fee.
    pub bridge: BridgeConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            bridge: BridgeConfig::sepolia(),
        }
    }
}

impl ToolsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_origin = var("INFLOW_BASE_ORIGIN").unwrap_or(defaults.base_origin);
        let usdc_token = var("INFLOW_USDC_ADDRESS").unwrap_or(defaults.bridge.usdc_token);
        let xreserve = var("INFLOW_XRESERVE_ADDRESS").unwrap_or(defaults.bridge.xreserve);

        let max_fee_units = var("INFLOW_MAX_FEE")
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .context("INFLOW_MAX_FEE must be a whole number of token units")?
            .unwrap_or(defaults.bridge.max_fee_units);

        Ok(Self {
            base_origin,
            bridge: BridgeConfig {
                usdc_token,
                xreserve,
                max_fee_units,
                decimals: defaults.bridge.decimals,
            },
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(origin) = &overrides.origin {
            self.base_origin = origin.clone();
        }
        if let Some(usdc) = &overrides.usdc {
            self.bridge.usdc_token = usdc.clone();
        }
        if let Some(xreserve) = &overrides.xreserve {
            self.bridge.xreserve = xreserve.clone();
        }
        if let Some(max_fee) = overrides.max_fee {
            self.bridge.max_fee_units = max_fee;
        }
        self
    }
}

/// Values given as global flags
#[derive(Clone, Debug, Default, clap::Args)]
pub struct Overrides {
    /// Pay page origin [env: INFLOW_BASE_ORIGIN]
    #[arg(long, global = true)]
    pub origin: Option<String>,
    /// USDC token contract [env: INFLOW_USDC_ADDRESS]
    #[arg(long, global = true)]
    pub usdc: Option<String>,
    /// xReserve bridge contract [env: INFLOW_XRESERVE_ADDRESS]
    #[arg(long, global = true)]
    pub xreserve: Option<String>,
    /// Maximum relayer fee in token units [env: INFLOW_MAX_FEE]
    #[arg(long, global = true)]
    pub max_fee: Option<u64>,
}
