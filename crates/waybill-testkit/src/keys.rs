//! Key test helpers
//!
//! Seeded secp256k1 keys so that hash ids and signatures are reproducible
//! across runs.

use k256::ecdsa::SigningKey;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use waybill_core::crypto::{export_public_key, generate_signing_key, sign_object};
use waybill_core::hash::hash;

/// Key fixture for consistent test key generation
#[derive(Debug, Clone)]
pub struct KeyFixture {
    signing_key: SigningKey,
    public_key: String,
}

impl KeyFixture {
    /// Create a key deterministically from a numeric seed
    pub fn from_seed(seed: u64) -> Self {
        Self::from_signing_key(generate_signing_key(&mut ChaCha20Rng::seed_from_u64(seed)))
    }

    /// Create a key deterministically from a label
    pub fn from_label(label: &str) -> Self {
        let seed = hash(label.as_bytes());
        Self::from_signing_key(generate_signing_key(&mut ChaCha20Rng::from_seed(seed)))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = export_public_key(signing_key.verifying_key()).expect("export public key");
        Self {
            signing_key,
            public_key,
        }
    }

    /// Hex DER SubjectPublicKeyInfo
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign the canonical form of a payload, returning hex DER
    pub fn sign<T: serde::Serialize + ?Sized>(&self, payload: &T) -> String {
        sign_object(payload, &self.signing_key).expect("sign payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_core::crypto::verify_object;

    #[test]
    fn test_seeded_keys_are_stable() {
        assert_eq!(KeyFixture::from_seed(5).public_key(), KeyFixture::from_seed(5).public_key());
        assert_ne!(KeyFixture::from_seed(5).public_key(), KeyFixture::from_seed(6).public_key());
        assert_eq!(
            KeyFixture::from_label("depot").public_key(),
            KeyFixture::from_label("depot").public_key()
        );
    }

    #[test]
    fn test_sign_verifies() {
        let key = KeyFixture::from_seed(1);
        let payload = serde_json::json!({ "n": 1 });
        assert!(verify_object(&payload, &key.sign(&payload), key.public_key()));
    }
}
