//! ECDSA signature service
//!
//! Signs and verifies the canonical serialization of logical objects, never a
//! pre-digested string. Keys and signatures travel as hex:
//!
//! - public keys: DER SubjectPublicKeyInfo
//! - private keys: SEC1 DER
//! - signatures: DER-encoded ECDSA (secp256k1, SHA-256 digest)

use crate::canonical;
use crate::errors::{Result, WaybillError};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::pkcs8::{DecodePublicKey, EncodePublicKey};
use k256::SecretKey;
use rand_core::CryptoRngCore;
use serde::Serialize;

/// Generate a fresh signing key from a cryptographic RNG
pub fn generate_signing_key(rng: &mut impl CryptoRngCore) -> SigningKey {
    SigningKey::random(rng)
}

/// Export a public key as hex DER SubjectPublicKeyInfo
pub fn export_public_key(key: &VerifyingKey) -> Result<String> {
    let document = key
        .to_public_key_der()
        .map_err(|e| WaybillError::serialization(format!("public key export failed: {e}")))?;
    Ok(hex::encode(document.as_bytes()))
}

/// Export a private key as hex SEC1 DER
pub fn export_private_key(key: &SigningKey) -> Result<String> {
    let secret = SecretKey::from(key);
    let der = secret
        .to_sec1_der()
        .map_err(|e| WaybillError::serialization(format!("private key export failed: {e}")))?;
    Ok(hex::encode(der.as_slice()))
}

/// Decode a hex DER SubjectPublicKeyInfo public key
pub fn import_public_key(hex_key: &str) -> Result<VerifyingKey> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| WaybillError::serialization(format!("public key is not hex: {e}")))?;
    VerifyingKey::from_public_key_der(&bytes)
        .map_err(|e| WaybillError::serialization(format!("public key is not valid DER: {e}")))
}

/// Decode a hex SEC1 DER private key
pub fn import_private_key(hex_key: &str) -> Result<SigningKey> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| WaybillError::serialization(format!("private key is not hex: {e}")))?;
    let secret = SecretKey::from_sec1_der(&bytes)
        .map_err(|e| WaybillError::serialization(format!("private key is not valid DER: {e}")))?;
    Ok(SigningKey::from(secret))
}

/// Sign the canonical serialization of `payload`, returning hex DER
pub fn sign_object<T: Serialize + ?Sized>(payload: &T, key: &SigningKey) -> Result<String> {
    let message = canonical::to_canonical_bytes(payload)?;
    let signature: Signature = key.sign(&message);
    Ok(hex::encode(signature.to_der().as_bytes()))
}

/// Sign with a hex SEC1 DER private key
pub fn sign_object_with_hex_key<T: Serialize + ?Sized>(
    payload: &T,
    private_key_hex: &str,
) -> Result<String> {
    let key = import_private_key(private_key_hex)?;
    sign_object(payload, &key)
}

/// Verify a hex DER signature over the canonical serialization of `payload`
///
/// Never fails: malformed keys, malformed signatures and unserializable
/// payloads all verify as `false`.
pub fn verify_object<T: Serialize + ?Sized>(
    payload: &T,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    let Ok(key) = import_public_key(public_key_hex) else {
        return false;
    };
    let Ok(signature_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(&signature_bytes) else {
        return false;
    };
    let Ok(message) = canonical::to_canonical_bytes(payload) else {
        return false;
    };
    // Other signers may emit high-S signatures; k256 only accepts low-S.
    let signature = signature.normalize_s().unwrap_or(signature);
    key.verify(&message, &signature).is_ok()
}
