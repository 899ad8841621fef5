//! Chain identifiers and bridge protocol constants
//!
//! The xReserve bridge addresses chains by a small integer "domain id". Those
//! ids are protocol constants and must match the deployed contracts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CodecError;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN IDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Bridge domain id of Ethereum
pub const ETHEREUM_DOMAIN: u32 = 0;
/// Bridge domain id of Stacks
pub const STACKS_DOMAIN: u32 = 10003;

/// USDC uses six decimals on both sides of the bridge.
pub const USDC_DECIMALS: u8 = 6;

// ═══════════════════════════════════════════════════════════════════════════════
// STACKS ADDRESS VERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Mainnet single-sig (`SP...`)
pub const STACKS_MAINNET_SINGLE_SIG: u8 = 22;
/// Mainnet multi-sig (`SM...`)
pub const STACKS_MAINNET_MULTI_SIG: u8 = 20;
/// Testnet single-sig (`ST...`)
pub const STACKS_TESTNET_SINGLE_SIG: u8 = 26;
/// Testnet multi-sig (`SN...`)
pub const STACKS_TESTNET_MULTI_SIG: u8 = 21;

/// Returns true for the four standard Stacks address versions.
pub fn is_known_stacks_version(version: u8) -> bool {
    matches!(
        version,
        STACKS_MAINNET_SINGLE_SIG
            | STACKS_MAINNET_MULTI_SIG
            | STACKS_TESTNET_SINGLE_SIG
            | STACKS_TESTNET_MULTI_SIG
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN
// ═══════════════════════════════════════════════════════════════════════════════

/// A chain on either side of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Stacks,
}

impl Chain {
    /// Bridge domain id for this chain
    pub fn domain_id(&self) -> u32 {
        match self {
            Self::Ethereum => ETHEREUM_DOMAIN,
            Self::Stacks => STACKS_DOMAIN,
        }
    }

    /// Reverse lookup from a domain id
    pub fn from_domain_id(domain: u32) -> Option<Self> {
        match domain {
            ETHEREUM_DOMAIN => Some(Self::Ethereum),
            STACKS_DOMAIN => Some(Self::Stacks),
            _ => None,
        }
    }

    /// The other side of the bridge
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Ethereum => Self::Stacks,
            Self::Stacks => Self::Ethereum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Stacks => "stacks",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Self::Ethereum),
            "stacks" | "stx" => Ok(Self::Stacks),
            other => Err(CodecError::InvalidArguments(format!("unknown chain: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_ids() {
        assert_eq!(Chain::Ethereum.domain_id(), 0);
        assert_eq!(Chain::Stacks.domain_id(), 10003);
        assert_eq!(Chain::from_domain_id(10003), Some(Chain::Stacks));
        assert_eq!(Chain::from_domain_id(7), None);
    }

    #[test]
    fn test_chain_parsing() {
        assert_eq!("Stacks".parse::<Chain>().unwrap(), Chain::Stacks);
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert!("solana".parse::<Chain>().is_err());
        assert_eq!(Chain::Stacks.counterpart(), Chain::Ethereum);
    }

    #[test]
    fn test_known_versions() {
        assert!(is_known_stacks_version(22));
        assert!(is_known_stacks_version(26));
        assert!(!is_known_stacks_version(0));
    }
}
