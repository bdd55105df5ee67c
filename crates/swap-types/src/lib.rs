use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Swap helper error types.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("{field} does not fit in {width} bytes")]
    FieldOverflow { field: &'static str, width: usize },

    #[error("unknown command opcode: {0}")]
    UnknownOpcode(u8),

    #[error("malformed command buffer: {0}")]
    MalformedCommand(String),

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("invalid compressed point: {0}")]
    InvalidCompressedPoint(String),

    #[error("no modular square root exists")]
    NoSquareRoot,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("remote error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SwapError>;

/// A 256-bit unsigned integer stored as 32 big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0u8; 32]);

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Checked conversion naming the offending field on overflow.
    pub fn fit(field: &'static str, value: &BigUint) -> Result<Self> {
        let bytes = fit_be_bytes::<32>(field, value)?;
        Ok(U256(bytes))
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&v.to_be_bytes());
        U256(bytes)
    }
}

impl TryFrom<&BigUint> for U256 {
    type Error = SwapError;

    fn try_from(value: &BigUint) -> Result<Self> {
        U256::fit("u256", value)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

/// Left-pad the big-endian bytes of `value` to `N`, rejecting wider values.
fn fit_be_bytes<const N: usize>(field: &'static str, value: &BigUint) -> Result<[u8; N]> {
    let bytes = value.to_bytes_be();
    // BigUint renders zero as a single 0x00 byte
    let bytes = if value.bits() == 0 { &[][..] } else { &bytes[..] };
    if bytes.len() > N {
        return Err(SwapError::FieldOverflow { field, width: N });
    }
    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

/// Narrow `value` to a 4-byte field.
pub fn fit_u32(field: &'static str, value: &BigUint) -> Result<u32> {
    Ok(u32::from_be_bytes(fit_be_bytes::<4>(field, value)?))
}

/// Narrow `value` to an 8-byte field.
pub fn fit_u64(field: &'static str, value: &BigUint) -> Result<u64> {
    Ok(u64::from_be_bytes(fit_be_bytes::<8>(field, value)?))
}

/// Parse a hex string to a big-endian byte array.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| SwapError::InvalidHex(e.to_string()))
}

/// Convert bytes to a 0x-prefixed hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> Hex {
    format!("0x{}", hex::encode(bytes))
}
