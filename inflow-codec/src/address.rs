//! Chain addresses and their 32-byte bridge recipient encoding
//!
//! The bridge contracts take every recipient as a `bytes32`:
//!
//! ```text
//! EVM address      [ 12 × 0x00 ][ 20-byte address            ]
//! Stacks principal [ 11 × 0x00 ][ version ][ 20-byte hash160 ]
//! ```
//!
//! Stacks principals are c32check strings: `S` + version character + c32
//! encoding of `hash160 || checksum`, where the checksum is the first four
//! bytes of `sha256(sha256(version || hash160))`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::{CodecError, Result, WORD_SIZE};

const EVM_ADDRESS_LEN: usize = 20;
const HASH160_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

/// Zero bytes in front of an EVM address inside a bytes32
const EVM_PADDING: usize = WORD_SIZE - EVM_ADDRESS_LEN;
/// Zero bytes in front of the version byte inside a bytes32
const STACKS_PADDING: usize = WORD_SIZE - HASH160_LEN - 1;

/// Crockford-style base32 alphabet used by c32check
const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Address family expected by [`address_to_fixed_width_hex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFormat {
    /// `0x` followed by 40 hex characters
    Evm,
    /// c32check principal (`SP...`, `ST...`, `SM...`, `SN...`)
    Stacks,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVM
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte EVM account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmAddress([u8; EVM_ADDRESS_LEN]);

impl EvmAddress {
    pub fn from_bytes(bytes: [u8; EVM_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; EVM_ADDRESS_LEN] {
        &self.0
    }

    /// Left-pad to a 32-byte word
    pub fn to_bytes32(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[EVM_PADDING..].copy_from_slice(&self.0);
        word
    }
}

impl FromStr for EvmAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let hex_part = s.strip_prefix("0x").ok_or_else(|| {
            CodecError::InvalidAddressFormat(format!("EVM address must start with 0x: {s}"))
        })?;

        if hex_part.len() != EVM_ADDRESS_LEN * 2 {
            return Err(CodecError::InvalidAddressFormat(format!(
                "EVM address must have 40 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; EVM_ADDRESS_LEN];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| CodecError::InvalidAddressFormat(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STACKS
// ═══════════════════════════════════════════════════════════════════════════════

/// A standard Stacks principal split into its version byte and hash160
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StacksAddress {
    version: u8,
    hash160: [u8; HASH160_LEN],
}

impl StacksAddress {
    /// Versions are 5-bit values; anything above 31 has no c32 character.
    pub fn new(version: u8, hash160: [u8; HASH160_LEN]) -> Result<Self> {
        if version as usize >= C32_ALPHABET.len() {
            return Err(CodecError::InvalidAddressFormat(format!(
                "Stacks address version out of range: {version}"
            )));
        }
        Ok(Self { version, hash160 })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &[u8; HASH160_LEN] {
        &self.hash160
    }

    /// `[11 zero bytes][version][hash160]`
    pub fn to_bytes32(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[STACKS_PADDING] = self.version;
        word[STACKS_PADDING + 1..].copy_from_slice(&self.hash160);
        word
    }
}

impl FromStr for StacksAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = c32_normalize(s);
        let rest = normalized.strip_prefix('S').ok_or_else(|| {
            CodecError::InvalidAddressFormat(format!("Stacks address must start with S: {s}"))
        })?;

        let mut chars = rest.chars();
        let version_char = chars.next().ok_or_else(|| {
            CodecError::InvalidAddressFormat(format!("Stacks address too short: {s}"))
        })?;
        let version = u8::try_from(version_char).ok().and_then(c32_value).ok_or_else(|| {
            CodecError::InvalidAddressFormat(format!("invalid version character in {s}"))
        })?;

        let payload = c32_decode(chars.as_str())?;
        if payload.len() != HASH160_LEN + CHECKSUM_LEN {
            return Err(CodecError::InvalidAddressFormat(format!(
                "Stacks address payload must be {} bytes, got {}",
                HASH160_LEN + CHECKSUM_LEN,
                payload.len()
            )));
        }

        let mut hash160 = [0u8; HASH160_LEN];
        hash160.copy_from_slice(&payload[..HASH160_LEN]);

        if payload[HASH160_LEN..] != c32_checksum(version, &hash160) {
            return Err(CodecError::InvalidAddressFormat(format!(
                "checksum mismatch in {s}"
            )));
        }

        Ok(Self { version, hash160 })
    }
}

impl fmt::Display for StacksAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(HASH160_LEN + CHECKSUM_LEN);
        payload.extend_from_slice(&self.hash160);
        payload.extend_from_slice(&c32_checksum(self.version, &self.hash160));

        write!(
            f,
            "S{}{}",
            C32_ALPHABET[self.version as usize] as char,
            c32_encode(&payload)
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Encode an address as a 64-character big-endian hex word (no `0x`).
///
/// The address must belong to `expected`; an EVM address passed as
/// [`AddressFormat::Stacks`] (or vice versa) is rejected.
pub fn address_to_fixed_width_hex(address: &str, expected: AddressFormat) -> Result<String> {
    let word = match expected {
        AddressFormat::Evm => evm_address_to_bytes32(address)?,
        AddressFormat::Stacks => stacks_address_to_bytes32(address)?,
    };
    Ok(hex::encode(word))
}

/// Encode a Stacks principal as a bridge recipient
pub fn stacks_address_to_bytes32(principal: &str) -> Result<[u8; WORD_SIZE]> {
    let address: StacksAddress = principal.parse()?;
    Ok(address.to_bytes32())
}

/// Encode an EVM address as a bridge recipient
pub fn evm_address_to_bytes32(address: &str) -> Result<[u8; WORD_SIZE]> {
    let address: EvmAddress = address.parse()?;
    Ok(address.to_bytes32())
}

/// Inverse of [`evm_address_to_bytes32`]
pub fn bytes32_to_evm_address(word: &[u8; WORD_SIZE]) -> Result<EvmAddress> {
    if word[..EVM_PADDING].iter().any(|b| *b != 0) {
        return Err(CodecError::InvalidAddressFormat(
            "EVM recipient has non-zero padding".to_string(),
        ));
    }

    let mut bytes = [0u8; EVM_ADDRESS_LEN];
    bytes.copy_from_slice(&word[EVM_PADDING..]);
    Ok(EvmAddress(bytes))
}

/// Inverse of [`stacks_address_to_bytes32`]
pub fn bytes32_to_stacks_address(word: &[u8; WORD_SIZE]) -> Result<StacksAddress> {
    if word[..STACKS_PADDING].iter().any(|b| *b != 0) {
        return Err(CodecError::InvalidAddressFormat(
            "Stacks recipient has non-zero padding".to_string(),
        ));
    }

    let mut hash160 = [0u8; HASH160_LEN];
    hash160.copy_from_slice(&word[STACKS_PADDING + 1..]);
    StacksAddress::new(word[STACKS_PADDING], hash160)
}

// ═══════════════════════════════════════════════════════════════════════════════
// C32
// ═══════════════════════════════════════════════════════════════════════════════

fn c32_normalize(s: &str) -> String {
    s.to_ascii_uppercase()
        .chars()
        .map(|c| match c {
            'O' => '0',
            'L' | 'I' => '1',
            other => other,
        })
        .collect()
}

fn c32_value(c: u8) -> Option<u8> {
    C32_ALPHABET.iter().position(|a| *a == c).map(|i| i as u8)
}

fn c32_checksum(version: u8, hash160: &[u8; HASH160_LEN]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(hash160);
    let once = hasher.finalize();
    let twice = Sha256::digest(once);

    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&twice[..CHECKSUM_LEN]);
    checksum
}

/// Base-32 encode `data` as a big-endian number, one `0` per leading zero byte.
fn c32_encode(data: &[u8]) -> String {
    let mut digits = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for byte in data.iter().rev() {
        acc |= (*byte as u32) << bits;
        bits += 8;
        while bits >= 5 {
            digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
            acc >>= 5;
            bits -= 5;
        }
    }
    if bits > 0 {
        digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
    }

    while digits.last() == Some(&b'0') {
        digits.pop();
    }

    let leading_zeros = data.iter().take_while(|b| **b == 0).count();
    digits.extend(std::iter::repeat(b'0').take(leading_zeros));
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Inverse of [`c32_encode`]; expects normalized input.
fn c32_decode(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(s.len() * 5 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for c in s.bytes().rev() {
        let value = c32_value(c).ok_or_else(|| {
            CodecError::InvalidAddressFormat(format!("invalid c32 character: {}", c as char))
        })?;
        acc |= (value as u32) << bits;
        bits += 5;
        while bits >= 8 {
            bytes.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        bytes.push((acc & 0xff) as u8);
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }

    let leading_zeros = s.bytes().take_while(|c| *c == b'0').count();
    bytes.extend(std::iter::repeat(0u8).take(leading_zeros));
    bytes.reverse();

    Ok(bytes)
}
