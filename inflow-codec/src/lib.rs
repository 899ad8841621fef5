//! inflow-codec
//!
//! Encoding primitives for moving USDC between Ethereum and Stacks through the
//! xReserve bridge. This crate converts human-facing values into the exact
//! bytes the bridge contracts consume:
//!
//! - chain addresses into the fixed 32-byte recipient format,
//! - decimal token amounts into fixed-point integer units and back,
//! - `approve` / `depositToRemote` call data.
//!
//! Everything here is pure and synchronous except the collaborator traits in
//! [`bridge`], which describe the wallet and transaction-submission services
//! the codec output is handed to.

use thiserror::Error;

pub mod abi;
pub mod address;
pub mod amount;
pub mod bridge;
pub mod chains;

pub use abi::{encode_contract_call, AbiArg, ContractCall, APPROVE_SELECTOR, DEPOSIT_SELECTOR};
pub use address::{
    address_to_fixed_width_hex, bytes32_to_evm_address, bytes32_to_stacks_address,
    evm_address_to_bytes32, stacks_address_to_bytes32, AddressFormat, EvmAddress,
    StacksAddress,
};
pub use amount::{
    format_units_to_decimal, normalize_decimal, parse_decimal_to_units,
    parse_decimal_to_units_strict,
};
pub use bridge::{
    execute_deposit, prepare_deposit, prepare_withdrawal, resolve_sender, BridgeConfig,
    BridgeSubmitter, DepositPlan, DepositReceipt, SubmitError, TxId, WalletCapability,
    WalletError, WithdrawalPlan,
};
pub use chains::{Chain, USDC_DECIMALS};

/// Width of every static ABI word and of an encoded bridge recipient.
pub const WORD_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount {amount} has more than {decimals} decimal places")]
    TooManyDecimalPlaces { amount: String, decimals: u8 },

    #[error("value does not fit in a uint256 word")]
    AmountOverflow,

    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
