//! Bridge call plans and the collaborators that carry them on-chain
//!
//! A deposit (Ethereum → Stacks) is two transactions: an ERC-20 `approve` for
//! the xReserve contract followed by `depositToRemote`. A withdrawal
//! (Stacks → Ethereum) is a single Stacks contract call whose recipient
//! argument is the 64-hex EVM word produced here.
//!
//! Wallet connection and transaction submission live outside this crate and
//! are described by [`WalletCapability`] and [`BridgeSubmitter`].

use async_trait::async_trait;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abi::ContractCall;
use crate::address::{
    address_to_fixed_width_hex, stacks_address_to_bytes32, AddressFormat, EvmAddress,
};
use crate::amount::parse_decimal_to_units_strict;
use crate::chains::{Chain, USDC_DECIMALS};
use crate::{CodecError, Result};

/// Sepolia USDC
pub const SEPOLIA_USDC: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";
/// Sepolia xReserve
pub const SEPOLIA_XRESERVE: &str = "0x008888878f94C0d87defdf0B07f46B93C1934442";

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Contracts and fee settings for the Ethereum side of the bridge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// USDC token contract
    pub usdc_token: String,
    /// xReserve bridge contract (the approve spender and deposit target)
    pub xreserve: String,
    /// Maximum relayer fee in token units
    #[serde(default)]
    pub max_fee_units: u64,
    /// Token decimals
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    USDC_DECIMALS
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}

impl BridgeConfig {
    /// Sepolia testnet deployment
    pub fn sepolia() -> Self {
        Self {
            usdc_token: SEPOLIA_USDC.to_string(),
            xreserve: SEPOLIA_XRESERVE.to_string(),
            max_fee_units: 0,
            decimals: USDC_DECIMALS,
        }
    }

    pub fn usdc_address(&self) -> Result<EvmAddress> {
        self.usdc_token.parse()
    }

    pub fn xreserve_address(&self) -> Result<EvmAddress> {
        self.xreserve.parse()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLANS
// ═══════════════════════════════════════════════════════════════════════════════

/// The two Ethereum calls of a deposit, already encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositPlan {
    pub amount_units: BigUint,
    pub token: EvmAddress,
    pub bridge: EvmAddress,
    pub approve: ContractCall,
    pub deposit: ContractCall,
    pub approve_call_data: Vec<u8>,
    pub deposit_call_data: Vec<u8>,
}

/// Arguments of the Stacks-side withdrawal call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalPlan {
    pub amount_units: String,
    pub native_domain: u32,
    /// EVM recipient as a 64-hex word, no `0x`
    pub native_recipient: String,
}

/// Build the approve + deposit calls moving `amount` USDC to a Stacks principal.
pub fn prepare_deposit(
    config: &BridgeConfig,
    amount: &str,
    stacks_recipient: &str,
) -> Result<DepositPlan> {
    let amount_units = parse_decimal_to_units_strict(amount, config.decimals)?;
    if amount_units == BigUint::default() {
        return Err(CodecError::InvalidAmount("amount must be greater than zero".to_string()));
    }

    let token = config.usdc_address()?;
    let bridge = config.xreserve_address()?;
    let remote_recipient = stacks_address_to_bytes32(stacks_recipient)?;

    let approve = ContractCall::Approve {
        spender: bridge,
        amount: amount_units.clone(),
    };
    let deposit = ContractCall::DepositToRemote {
        value: amount_units.clone(),
        remote_domain: Chain::Stacks.domain_id(),
        remote_recipient,
        local_token: token,
        max_fee: BigUint::from(config.max_fee_units),
        hook_data: Vec::new(),
    };

    let approve_call_data = approve.encode()?;
    let deposit_call_data = deposit.encode()?;

    Ok(DepositPlan {
        amount_units,
        token,
        bridge,
        approve,
        deposit,
        approve_call_data,
        deposit_call_data,
    })
}

/// Build the arguments for withdrawing `amount` USDC to an Ethereum address.
pub fn prepare_withdrawal(amount: &str, evm_recipient: &str) -> Result<WithdrawalPlan> {
    let amount_units = parse_decimal_to_units_strict(amount, USDC_DECIMALS)?;
    if amount_units == BigUint::default() {
        return Err(CodecError::InvalidAmount("amount must be greater than zero".to_string()));
    }

    Ok(WithdrawalPlan {
        amount_units: amount_units.to_str_radix(10),
        native_domain: Chain::Ethereum.domain_id(),
        native_recipient: address_to_fixed_width_hex(evm_recipient, AddressFormat::Evm)?,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Transaction identifier returned by a submitter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("user cancelled the connection")]
    Cancelled,

    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("submitter unavailable: {0}")]
    Unavailable(String),
}

/// Wallet connection for one chain at a time
#[async_trait]
pub trait WalletCapability: Send + Sync {
    async fn connect(&self, chain: Chain) -> std::result::Result<String, WalletError>;

    async fn disconnect(&self, chain: Chain);

    async fn current_address(&self, chain: Chain) -> Option<String>;
}

/// Sends encoded call data to a contract and returns the transaction id
#[async_trait]
pub trait BridgeSubmitter: Send + Sync {
    async fn submit(
        &self,
        to: &EvmAddress,
        call_data: &[u8],
    ) -> std::result::Result<TxId, SubmitError>;
}

/// Transactions sent for a deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    pub approve_tx: TxId,
    pub deposit_tx: TxId,
}

/// Return the connected address for `chain`, prompting a connection if needed.
pub async fn resolve_sender<W: WalletCapability + ?Sized>(
    wallet: &W,
    chain: Chain,
) -> std::result::Result<String, WalletError> {
    if let Some(address) = wallet.current_address(chain).await {
        return Ok(address);
    }
    wallet.connect(chain).await
}

/// Submit the approve then the deposit; the deposit is never sent if the
/// approve fails.
pub async fn execute_deposit<S: BridgeSubmitter + ?Sized>(
    submitter: &S,
    plan: &DepositPlan,
) -> std::result::Result<DepositReceipt, SubmitError> {
    let approve_tx = submitter
        .submit(&plan.token, &plan.approve_call_data)
        .await
        .map_err(|e| {
            tracing::warn!("approve for {} units failed: {}", plan.amount_units, e);
            e
        })?;
    tracing::info!("approve submitted: {}", approve_tx.0);

    let deposit_tx = submitter
        .submit(&plan.bridge, &plan.deposit_call_data)
        .await
        .map_err(|e| {
            tracing::warn!("deposit of {} units failed: {}", plan.amount_units, e);
            e
        })?;
    tracing::info!("deposit submitted: {}", deposit_tx.0);

    Ok(DepositReceipt {
        approve_tx,
        deposit_tx,
    })
}
