//! ABI call data for the two bridge calls
//!
//! Only two call shapes are ever sent to Ethereum:
//!
//! ```text
//! approve(address spender, uint256 amount)                      0x095ea7b3
//! depositToRemote(uint256 value, uint32 remoteDomain,
//!                 bytes32 remoteRecipient, address localToken,
//!                 uint256 maxFee, bytes hookData)               0xfaadb53b
//! ```
//!
//! Static arguments occupy one 32-byte big-endian word each. The trailing
//! `bytes` is dynamic: its head word is the byte offset of the tail (counted
//! from the start of the arguments), the tail is a length word followed by
//! the data right-padded to a word boundary.

use num_bigint::BigUint;

use crate::address::EvmAddress;
use crate::{CodecError, Result, WORD_SIZE};

/// `bytes4(keccak256("approve(address,uint256)"))`
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
/// Selector of the xReserve `depositToRemote` entry point
pub const DEPOSIT_SELECTOR: [u8; 4] = [0xfa, 0xad, 0xb5, 0x3b];

pub const APPROVE_FN: &str = "approve";
pub const DEPOSIT_FN: &str = "depositToRemote";

/// Number of head words in a `depositToRemote` call
const DEPOSIT_HEAD_WORDS: usize = 6;

/// A loosely typed argument for name-based call construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiArg {
    Uint(BigUint),
    Address(EvmAddress),
    Bytes32([u8; WORD_SIZE]),
    Bytes(Vec<u8>),
}

/// One of the supported bridge calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// ERC-20 allowance for the bridge contract
    Approve { spender: EvmAddress, amount: BigUint },
    /// Lock tokens on Ethereum and mint on the remote domain
    DepositToRemote {
        value: BigUint,
        remote_domain: u32,
        remote_recipient: [u8; WORD_SIZE],
        local_token: EvmAddress,
        max_fee: BigUint,
        hook_data: Vec<u8>,
    },
}

impl ContractCall {
    /// Build a call from a function name and positional arguments.
    pub fn from_name(function: &str, args: Vec<AbiArg>) -> Result<Self> {
        match function {
            APPROVE_FN => match <[AbiArg; 2]>::try_from(args) {
                Ok([AbiArg::Address(spender), AbiArg::Uint(amount)]) => {
                    Ok(Self::Approve { spender, amount })
                }
                _ => Err(CodecError::InvalidArguments(
                    "approve expects (address, uint256)".to_string(),
                )),
            },
            DEPOSIT_FN => match <[AbiArg; 6]>::try_from(args) {
                Ok([
                    AbiArg::Uint(value),
                    AbiArg::Uint(domain),
                    AbiArg::Bytes32(remote_recipient),
                    AbiArg::Address(local_token),
                    AbiArg::Uint(max_fee),
                    AbiArg::Bytes(hook_data),
                ]) => {
                    let remote_domain = u32::try_from(&domain).map_err(|_| {
                        CodecError::InvalidArguments(format!("domain {domain} exceeds uint32"))
                    })?;
                    Ok(Self::DepositToRemote {
                        value,
                        remote_domain,
                        remote_recipient,
                        local_token,
                        max_fee,
                        hook_data,
                    })
                }
                _ => Err(CodecError::InvalidArguments(
                    "depositToRemote expects (uint256, uint32, bytes32, address, uint256, bytes)"
                        .to_string(),
                )),
            },
            other => Err(CodecError::UnsupportedFunction(other.to_string())),
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => APPROVE_FN,
            Self::DepositToRemote { .. } => DEPOSIT_FN,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::Approve { .. } => APPROVE_SELECTOR,
            Self::DepositToRemote { .. } => DEPOSIT_SELECTOR,
        }
    }

    /// Raw call data: selector followed by the encoded arguments
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::Approve { spender, amount } => {
                let mut encoded = Vec::with_capacity(4 + 2 * WORD_SIZE);
                encoded.extend_from_slice(&APPROVE_SELECTOR);

                // address spender
                encoded.extend_from_slice(&spender.to_bytes32());
                // uint256 amount
                encoded.extend_from_slice(&uint256_word(amount)?);

                Ok(encoded)
            }
            Self::DepositToRemote {
                value,
                remote_domain,
                remote_recipient,
                local_token,
                max_fee,
                hook_data,
            } => {
                let padded_len = ((hook_data.len() + WORD_SIZE - 1) / WORD_SIZE) * WORD_SIZE;
                let mut encoded =
                    Vec::with_capacity(4 + (DEPOSIT_HEAD_WORDS + 1) * WORD_SIZE + padded_len);
                encoded.extend_from_slice(&DEPOSIT_SELECTOR);

                // uint256 value
                encoded.extend_from_slice(&uint256_word(value)?);
                // uint32 remoteDomain
                encoded.extend_from_slice(&u64_word(*remote_domain as u64));
                // bytes32 remoteRecipient
                encoded.extend_from_slice(remote_recipient);
                // address localToken
                encoded.extend_from_slice(&local_token.to_bytes32());
                // uint256 maxFee
                encoded.extend_from_slice(&uint256_word(max_fee)?);
                // bytes hookData: offset of the tail
                encoded.extend_from_slice(&u64_word((DEPOSIT_HEAD_WORDS * WORD_SIZE) as u64));

                // tail: length, then data padded to a word boundary
                encoded.extend_from_slice(&u64_word(hook_data.len() as u64));
                let mut padded = vec![0u8; padded_len];
                padded[..hook_data.len()].copy_from_slice(hook_data);
                encoded.extend_from_slice(&padded);

                Ok(encoded)
            }
        }
    }
}

/// `0x`-prefixed hex call data
pub fn encode_contract_call(call: &ContractCall) -> Result<String> {
    Ok(format!("0x{}", hex::encode(call.encode()?)))
}

/// Big-endian uint256 word; fails if the value needs more than 32 bytes.
pub fn uint256_word(value: &BigUint) -> Result<[u8; WORD_SIZE]> {
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD_SIZE {
        return Err(CodecError::AmountOverflow);
    }

    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

fn u64_word(value: u64) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::stacks_address_to_bytes32;

    const SPENDER: &str = "0x008888878f94C0d87defdf0B07f46B93C1934442";
    const USDC: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";

    fn deposit_call(hook_data: Vec<u8>) -> ContractCall {
        ContractCall::DepositToRemote {
            value: BigUint::from(100_500_000u64),
            remote_domain: 10003,
            remote_recipient: stacks_address_to_bytes32("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
                .unwrap(),
            local_token: USDC.parse().unwrap(),
            max_fee: BigUint::from(0u8),
            hook_data,
        }
    }

    #[test]
    fn test_approve_encoding() {
        let call = ContractCall::Approve {
            spender: SPENDER.parse().unwrap(),
            amount: BigUint::from(100_500_000u64),
        };

        assert_eq!(
            encode_contract_call(&call).unwrap(),
            "0x095ea7b3\
             000000000000000000000000008888878f94c0d87defdf0b07f46b93c1934442\
             0000000000000000000000000000000000000000000000000000000005fd8220"
        );
    }

    #[test]
    fn test_deposit_encoding() {
        let encoded = deposit_call(Vec::new()).encode().unwrap();
        assert_eq!(encoded.len(), 4 + 7 * 32);

        assert_eq!(
            format!("0x{}", hex::encode(&encoded)),
            "0xfaadb53b\
             0000000000000000000000000000000000000000000000000000000005fd8220\
             0000000000000000000000000000000000000000000000000000000000002713\
             00000000000000000000001a6d78de7b0625dfbfc16c3a8a5735f6dc3dc3f2ce\
             0000000000000000000000001c7d4b196cb0c7b01d743fbc6116a902379c7238\
             0000000000000000000000000000000000000000000000000000000000000000\
             00000000000000000000000000000000000000000000000000000000000000c0\
             0000000000000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_deposit_hook_data_padding() {
        let encoded = deposit_call(vec![0xab; 33]).encode().unwrap();
        // head + length word + two data words
        assert_eq!(encoded.len(), 4 + 7 * 32 + 64);

        let length_word = &encoded[4 + 6 * 32..4 + 7 * 32];
        assert_eq!(length_word[31], 33);

        let tail = &encoded[4 + 7 * 32..];
        assert!(tail[..33].iter().all(|b| *b == 0xab));
        assert!(tail[33..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_from_name() {
        let call = ContractCall::from_name(
            "approve",
            vec![
                AbiArg::Address(SPENDER.parse().unwrap()),
                AbiArg::Uint(BigUint::from(5u8)),
            ],
        )
        .unwrap();
        assert_eq!(call.function_name(), "approve");
        assert_eq!(call.selector(), APPROVE_SELECTOR);

        let err = ContractCall::from_name("transfer", vec![]).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedFunction("transfer".to_string()));

        let err = ContractCall::from_name("approve", vec![AbiArg::Uint(BigUint::from(5u8))])
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidArguments(_)));
    }

    #[test]
    fn test_from_name_deposit_domain_range() {
        let args = |domain: BigUint| {
            vec![
                AbiArg::Uint(BigUint::from(1u8)),
                AbiArg::Uint(domain),
                AbiArg::Bytes32([0u8; 32]),
                AbiArg::Address(USDC.parse().unwrap()),
                AbiArg::Uint(BigUint::from(0u8)),
                AbiArg::Bytes(Vec::new()),
            ]
        };

        assert!(ContractCall::from_name("depositToRemote", args(BigUint::from(10003u32))).is_ok());
        let err = ContractCall::from_name("depositToRemote", args(BigUint::from(1u64 << 40)))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidArguments(_)));
    }

    #[test]
    fn test_uint256_overflow() {
        let max = (BigUint::from(1u8) << 256) - 1u8;
        assert_eq!(uint256_word(&max).unwrap(), [0xff; 32]);
        assert_eq!(
            uint256_word(&(BigUint::from(1u8) << 256)).unwrap_err(),
            CodecError::AmountOverflow
        );
    }
}
