//! Deterministic Schnorr signatures over BabyJubjub.
//!
//! ```text
//! r = H(sk || m) mod l        R = r·G
//! h = H(R || A || m) mod l    S = r + h·sk mod l
//! signature = compress(R) || S (big-endian)
//! ```
//!
//! `H` is SHA-256 and `A` the compressed public key.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use swap_types::{Result, SwapError};

use crate::babyjubjub;
use crate::keys::{private_scalar, scalar_to_bytes};

pub const SIGNATURE_LEN: usize = 64;

fn hash_to_scalar(parts: &[&[u8]]) -> BigUint {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    BigUint::from_bytes_be(&hasher.finalize()) % babyjubjub::subgroup_order()
}

pub fn sign(message: &[u8], private_key: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let sk = private_scalar(private_key)?;
    let order = babyjubjub::subgroup_order();

    let a = babyjubjub::compress(&babyjubjub::mul_generator(&sk))?;
    let r = hash_to_scalar(&[private_key, message]);
    let big_r = babyjubjub::compress(&babyjubjub::mul_generator(&r))
        .map_err(|e| SwapError::Signing(e.to_string()))?;
    let h = hash_to_scalar(&[&big_r[..], &a[..], message]);
    let s = (r + h * sk) % order;

    let mut signature = [0u8; SIGNATURE_LEN];
    signature[..32].copy_from_slice(&big_r);
    signature[32..].copy_from_slice(&scalar_to_bytes(&s));
    Ok(signature)
}

pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<()> {
    let signature: &[u8; SIGNATURE_LEN] = signature
        .try_into()
        .map_err(|_| SwapError::InvalidSignature)?;
    let public_key: &[u8; 32] = public_key
        .try_into()
        .map_err(|_| SwapError::InvalidCompressedPoint("public key must be 32 bytes".into()))?;

    let mut big_r_bytes = [0u8; 32];
    big_r_bytes.copy_from_slice(&signature[..32]);
    let s = BigUint::from_bytes_be(&signature[32..]);
    if s >= babyjubjub::subgroup_order() {
        return Err(SwapError::InvalidSignature);
    }

    let big_r = babyjubjub::decompress(&big_r_bytes)?;
    let a = babyjubjub::decompress(public_key)?;
    let h = hash_to_scalar(&[&big_r_bytes[..], &public_key[..], message]);

    let lhs = babyjubjub::mul_generator(&s);
    let rhs = babyjubjub::add(&big_r, &babyjubjub::mul(&a, &h));
    if lhs != rhs {
        return Err(SwapError::InvalidSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{derive_private_key, public_key};

    fn key() -> [u8; 32] {
        derive_private_key(b"alice", b"/delphinus/swap").unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let sk = key();
        let pk = public_key(&sk).unwrap();
        let msg = [7u8; 81];

        let sig = sign(&msg, &sk).unwrap();
        assert_eq!(sig.len(), SIGNATURE_LEN);
        verify(&msg, &sig, &pk).unwrap();
    }

    #[test]
    fn test_signature_is_deterministic() {
        let sk = key();
        assert_eq!(sign(b"msg", &sk).unwrap(), sign(b"msg", &sk).unwrap());
        assert_ne!(sign(b"msg", &sk).unwrap(), sign(b"msh", &sk).unwrap());
    }

    #[test]
    fn test_tampered_message_rejected() {
        let sk = key();
        let pk = public_key(&sk).unwrap();
        let mut msg = [0u8; 81];
        let sig = sign(&msg, &sk).unwrap();

        msg[17] = 1;
        assert!(matches!(
            verify(&msg, &sig, &pk),
            Err(SwapError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sk = key();
        let other = derive_private_key(b"bob", b"/delphinus/swap").unwrap();
        let sig = sign(b"msg", &sk).unwrap();
        assert!(verify(b"msg", &sig, &public_key(&other).unwrap()).is_err());
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let sk = key();
        let pk = public_key(&sk).unwrap();
        let sig = sign(b"msg", &sk).unwrap();
        assert!(matches!(
            verify(b"msg", &sig[..63], &pk),
            Err(SwapError::InvalidSignature)
        ));
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            sign(b"msg", &[0u8; 32]),
            Err(SwapError::InvalidPrivateKey)
        ));
    }
}
