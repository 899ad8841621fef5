//! Integration tests for the bridge codec
//!
//! These tests drive the public API end to end:
//! 1. Recipient encoding for both chains
//! 2. Amount conversions at USDC precision
//! 3. Deposit plans handed to a mock submitter
//! 4. Wallet resolution through the collaborator trait

use std::sync::Mutex;

use async_trait::async_trait;
use inflow_codec::bridge::resolve_sender;
use inflow_codec::{
    bytes32_to_stacks_address, encode_contract_call, evm_address_to_bytes32,
    execute_deposit, format_units_to_decimal, parse_decimal_to_units, prepare_deposit,
    stacks_address_to_bytes32, AbiArg, BridgeConfig, BridgeSubmitter, Chain, CodecError,
    ContractCall, EvmAddress, SubmitError, TxId, WalletCapability, WalletError,
};
use num_bigint::BigUint;
use proptest::prelude::*;

const STACKS_RECIPIENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

// ═══════════════════════════════════════════════════════════════════════════════
// MOCK COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct RecordingSubmitter {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    fail_on: Option<usize>,
}

#[async_trait]
impl BridgeSubmitter for RecordingSubmitter {
    async fn submit(&self, to: &EvmAddress, call_data: &[u8]) -> Result<TxId, SubmitError> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_on == Some(sent.len()) {
            return Err(SubmitError::Rejected("user denied signature".into()));
        }
        sent.push((to.to_string(), call_data.to_vec()));
        Ok(TxId(format!("0xtx{}", sent.len())))
    }
}

struct StaticWallet {
    connected: Option<String>,
    cancel: bool,
}

#[async_trait]
impl WalletCapability for StaticWallet {
    async fn connect(&self, _chain: Chain) -> Result<String, WalletError> {
        if self.cancel {
            Err(WalletError::Cancelled)
        } else {
            Ok("0x1234567890123456789012345678901234567890".to_string())
        }
    }

    async fn disconnect(&self, _chain: Chain) {}

    async fn current_address(&self, _chain: Chain) -> Option<String> {
        self.connected.clone()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_evm_recipient_layout() {
    let word = evm_address_to_bytes32("0x1234567890123456789012345678901234567890").unwrap();

    assert_eq!(word.len(), 32);
    assert_eq!(word[..12], [0u8; 12]);
    assert_eq!(
        word[12..],
        hex::decode("1234567890123456789012345678901234567890").unwrap()[..]
    );
}

#[test]
fn test_stacks_recipient_roundtrip() {
    let word = stacks_address_to_bytes32(STACKS_RECIPIENT).unwrap();
    assert_eq!(word[..11], [0u8; 11]);

    let decoded = bytes32_to_stacks_address(&word).unwrap();
    assert_eq!(decoded.to_string(), STACKS_RECIPIENT);
}

#[test]
fn test_usdc_amount_scenario() {
    let units = parse_decimal_to_units("100.50", 6).unwrap();
    assert_eq!(units, BigUint::from(100_500_000u64));
    assert_eq!(format_units_to_decimal(&units, 6), "100.500000");
}

#[test]
fn test_name_based_call_matches_typed_call() {
    let spender: EvmAddress = "0x008888878f94C0d87defdf0B07f46B93C1934442".parse().unwrap();
    let typed = ContractCall::Approve {
        spender,
        amount: BigUint::from(1_000_000u64),
    };
    let named = ContractCall::from_name(
        "approve",
        vec![AbiArg::Address(spender), AbiArg::Uint(BigUint::from(1_000_000u64))],
    )
    .unwrap();

    assert_eq!(
        encode_contract_call(&typed).unwrap(),
        encode_contract_call(&named).unwrap()
    );
    assert!(matches!(
        ContractCall::from_name("burn", vec![]),
        Err(CodecError::UnsupportedFunction(_))
    ));
}

proptest! {
    #[test]
    fn prop_evm_recipient_is_left_padded(bytes in proptest::array::uniform20(any::<u8>())) {
        let address = format!("0x{}", hex::encode(bytes));
        let word = evm_address_to_bytes32(&address).unwrap();
        prop_assert_eq!(word.len(), 32);
        prop_assert_eq!(&word[..12], &[0u8; 12][..]);
        prop_assert_eq!(&word[12..], &bytes[..]);
    }

    #[test]
    fn prop_stacks_recipient_roundtrip(
        version in prop_oneof![Just(20u8), Just(21u8), Just(22u8), Just(26u8)],
        hash in proptest::array::uniform20(any::<u8>()),
    ) {
        let address = inflow_codec::StacksAddress::new(version, hash).unwrap().to_string();
        let word = stacks_address_to_bytes32(&address).unwrap();
        prop_assert_eq!(word[11], version);
        prop_assert_eq!(bytes32_to_stacks_address(&word).unwrap().to_string(), address);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_execute_deposit_sends_approve_then_deposit() {
    let config = BridgeConfig::sepolia();
    let plan = prepare_deposit(&config, "25", STACKS_RECIPIENT).unwrap();
    let submitter = RecordingSubmitter::default();

    let receipt = execute_deposit(&submitter, &plan).await.unwrap();
    assert_eq!(receipt.approve_tx, TxId("0xtx1".into()));
    assert_eq!(receipt.deposit_tx, TxId("0xtx2".into()));

    let sent = submitter.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, config.usdc_token.to_lowercase());
    assert_eq!(sent[0].1[..4], [0x09, 0x5e, 0xa7, 0xb3]);
    assert_eq!(sent[1].0, config.xreserve.to_lowercase());
    assert_eq!(sent[1].1[..4], [0xfa, 0xad, 0xb5, 0x3b]);
}

#[tokio::test]
async fn test_failed_approve_skips_deposit() {
    let plan = prepare_deposit(&BridgeConfig::sepolia(), "25", STACKS_RECIPIENT).unwrap();
    let submitter = RecordingSubmitter {
        fail_on: Some(0),
        ..Default::default()
    };

    let err = execute_deposit(&submitter, &plan).await.unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
    assert!(submitter.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_sender() {
    let connected = StaticWallet {
        connected: Some("0xabc".into()),
        cancel: true,
    };
    assert_eq!(resolve_sender(&connected, Chain::Ethereum).await.unwrap(), "0xabc");

    let fresh = StaticWallet {
        connected: None,
        cancel: false,
    };
    assert_eq!(
        resolve_sender(&fresh, Chain::Ethereum).await.unwrap(),
        "0x1234567890123456789012345678901234567890"
    );

    let cancelled = StaticWallet {
        connected: None,
        cancel: true,
    };
    assert_eq!(
        resolve_sender(&cancelled, Chain::Stacks).await.unwrap_err(),
        WalletError::Cancelled
    );
}
