//! Key derivation and signing capability for swap commands.
//!
//! The encoder only depends on the [`CryptoUtil`] trait. [`BabyJubjub`] is the
//! bundled implementation: HKDF-SHA256 key derivation and deterministic
//! Schnorr signatures over the BabyJubjub curve.

use swap_types::Result;

pub mod babyjubjub;
pub mod eddsa;
pub mod keys;

/// Key derivation, public key extraction and signing.
///
/// Implementations must be deterministic for `derive_private_key`.
pub trait CryptoUtil: Send + Sync {
    fn derive_private_key(&self, seed: &[u8], suffix: &[u8]) -> Result<Vec<u8>>;
    fn get_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>>;
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>>;
}

impl<C: CryptoUtil + ?Sized> CryptoUtil for std::sync::Arc<C> {
    fn derive_private_key(&self, seed: &[u8], suffix: &[u8]) -> Result<Vec<u8>> {
        (**self).derive_private_key(seed, suffix)
    }

    fn get_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
        (**self).get_public_key(private_key)
    }

    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(message, private_key)
    }
}

/// BabyJubjub-backed [`CryptoUtil`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BabyJubjub;

impl BabyJubjub {
    /// Check a signature produced by [`CryptoUtil::sign`].
    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<()> {
        eddsa::verify(message, signature, public_key)
    }
}

impl CryptoUtil for BabyJubjub {
    fn derive_private_key(&self, seed: &[u8], suffix: &[u8]) -> Result<Vec<u8>> {
        Ok(keys::derive_private_key(seed, suffix)?.to_vec())
    }

    fn get_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
        Ok(keys::public_key(private_key)?.to_vec())
    }

    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        Ok(eddsa::sign(message, private_key)?.to_vec())
    }
}
