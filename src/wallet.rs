//! Solana wallet keys
//!
//! - Decodes base58 secret keys (64-byte Ed25519 keypair layout)
//! - Derives the public identity sent as `key` on login
//! - Produces detached Ed25519 signatures over the login message

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, KEYPAIR_LENGTH};

use crate::error::{ClaimError, Result};

/// Base58 secret key as read from the accounts file.
///
/// Decoding is deferred to [`Wallet::from_secret`] so a malformed line only
/// fails its own account.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Ed25519 public key of a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity([u8; 32]);

impl Identity {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Detached Ed25519 signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

/// A decoded signing keypair, alive only while one account is processed
pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Decode a base58 secret key into a signing keypair.
    ///
    /// The key must decode to exactly 64 bytes (seed followed by public key),
    /// and the public half must match the seed.
    pub fn from_secret(secret: &SecretKey) -> Result<Self> {
        let bytes = bs58::decode(secret.expose().trim())
            .into_vec()
            .map_err(|e| ClaimError::InvalidKeyMaterial(format!("not valid base58: {}", e)))?;

        let keypair: [u8; KEYPAIR_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            ClaimError::InvalidKeyMaterial(format!(
                "decoded to {} bytes (expected {})",
                bytes.len(),
                KEYPAIR_LENGTH
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(&keypair).map_err(|_| {
            ClaimError::InvalidKeyMaterial("public key does not match secret seed".to_string())
        })?;

        Ok(Self { signing_key })
    }

    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

pub fn derive_public_identity(secret: &SecretKey) -> Result<Identity> {
    Ok(Wallet::from_secret(secret)?.identity())
}

pub fn sign_detached(message: &[u8], secret: &SecretKey) -> Result<Signature> {
    Ok(Wallet::from_secret(secret)?.sign(message))
}

#[cfg(test)]
pub(crate) fn test_secret(seed: u8) -> SecretKey {
    let signing_key = SigningKey::from_bytes(&[seed; 32]);
    SecretKey::new(bs58::encode(signing_key.to_keypair_bytes()).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    #[test]
    fn test_identity_matches_seed() {
        let secret = test_secret(7);
        let expected = SigningKey::from_bytes(&[7; 32]).verifying_key().to_bytes();
        assert_eq!(derive_public_identity(&secret).unwrap().as_bytes(), &expected);
    }

    #[test]
    fn test_signature_verifies() {
        let secret = test_secret(1);
        let identity = derive_public_identity(&secret).unwrap();
        let signature = sign_detached(b"abc123", &secret).unwrap();

        let key = VerifyingKey::from_bytes(identity.as_bytes()).unwrap();
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        assert!(key.verify(b"abc123", &sig).is_ok());
        assert!(key.verify(b"abc124", &sig).is_err());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let secret = test_secret(3);
        let a = sign_detached(b"hello", &secret).unwrap();
        let b = sign_detached(b"hello", &secret).unwrap();
        assert_eq!(a, b);

        assert_ne!(a, sign_detached(b"hello!", &secret).unwrap());
        assert_ne!(a, sign_detached(b"hello", &test_secret(4)).unwrap());
    }

    #[test]
    fn test_wrong_length_rejected() {
        // 32-byte seed alone is not a Solana secret key
        let short = SecretKey::new(bs58::encode([9u8; 32]).into_string());
        assert!(matches!(
            derive_public_identity(&short),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            sign_detached(b"msg", &short),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));

        let long = SecretKey::new(bs58::encode([9u8; 65]).into_string());
        assert!(matches!(
            Wallet::from_secret(&long),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));

        let empty = SecretKey::new("");
        assert!(matches!(
            Wallet::from_secret(&empty),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_not_base58_rejected() {
        let secret = SecretKey::new("0OIl-not-base58");
        assert!(matches!(
            Wallet::from_secret(&secret),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_mismatched_public_half_rejected() {
        let mut bytes = SigningKey::from_bytes(&[5; 32]).to_keypair_bytes();
        bytes[40] ^= 0xff;
        let secret = SecretKey::new(bs58::encode(bytes).into_string());
        assert!(matches!(
            Wallet::from_secret(&secret),
            Err(ClaimError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = test_secret(2);
        assert_eq!(format!("{:?}", secret), "SecretKey(<redacted>)");
    }
}
