//! Private key derivation via HKDF-SHA256.
//!
//! Flow: (seed, domain suffix) → HKDF-SHA256 → scalar mod l → 32-byte key

use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;
use swap_types::{Result, SwapError};

use crate::babyjubjub;

/// Derive a private scalar from a seed, scoped by `suffix`.
///
/// HKDF runs with no salt; the suffix is the `info` input so the same account
/// seed yields unrelated keys in different protocol namespaces.
pub fn derive_private_key(seed: &[u8], suffix: &[u8]) -> Result<[u8; 32]> {
    if seed.is_empty() {
        return Err(SwapError::KeyDerivation("empty seed".into()));
    }

    let hk = Hkdf::<Sha256>::new(None, seed);
    let mut okm = [0u8; 32];
    hk.expand(suffix, &mut okm)
        .map_err(|e| SwapError::KeyDerivation(e.to_string()))?;

    let scalar = BigUint::from_bytes_be(&okm) % babyjubjub::subgroup_order();
    if scalar.bits() == 0 {
        return Err(SwapError::KeyDerivation("derived scalar is zero".into()));
    }
    Ok(scalar_to_bytes(&scalar))
}

/// Parse a private key, requiring `0 < sk < l`.
pub fn private_scalar(private_key: &[u8]) -> Result<BigUint> {
    if private_key.len() != 32 {
        return Err(SwapError::InvalidPrivateKey);
    }
    let sk = BigUint::from_bytes_be(private_key);
    if sk.bits() == 0 || sk >= babyjubjub::subgroup_order() {
        return Err(SwapError::InvalidPrivateKey);
    }
    Ok(sk)
}

/// Compressed public key `sk·G`.
pub fn public_key(private_key: &[u8]) -> Result<[u8; 32]> {
    let sk = private_scalar(private_key)?;
    babyjubjub::compress(&babyjubjub::mul_generator(&sk))
}

/// 32-byte big-endian encoding of a scalar below `l`.
pub(crate) fn scalar_to_bytes(scalar: &BigUint) -> [u8; 32] {
    let bytes = scalar.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}
