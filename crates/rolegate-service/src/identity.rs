//! Identity resolver: maps credentials to a subject id.
//!
//! Secrets are never stored or compared in plaintext. Accounts carry a salted
//! PBKDF2-HMAC-SHA256 encoding and login re-derives against the stored salt.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use rolegate_core::{PortalError, Result};
use rolegate_store::DocumentStore;
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use base64::Engine as _;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const SCHEME: &str = "pbkdf2-sha256";

pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Opaque salted-hash encoding: `pbkdf2-sha256$iterations$salt_b64$hash_b64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretHash(String);

impl SecretHash {
    /// Derive a fresh encoding for `secret` with a random salt.
    pub fn derive(secret: &str, iterations: u32) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = derive_bytes(secret, &salt, iterations)?;
        Ok(Self(format!(
            "{SCHEME}${iterations}${}${}",
            B64.encode(salt),
            B64.encode(hash)
        )))
    }

    /// Re-derive `secret` against the stored salt and compare.
    ///
    /// Any malformed encoding verifies as false rather than erroring; a
    /// corrupt stored hash must read as bad credentials, not a server fault.
    pub fn verify(encoded: &str, secret: &str) -> bool {
        let mut parts = encoded.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(hash)) else {
            return false;
        };
        match derive_bytes(secret, &salt, iterations) {
            Ok(derived) => derived.as_slice() == expected.as_slice(),
            Err(_) => false,
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn derive_bytes(secret: &str, salt: &[u8], iterations: u32) -> Result<[u8; HASH_LEN]> {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::<Hmac<Sha256>>(secret.as_bytes(), salt, iterations, &mut out)
        .map_err(|e| PortalError::Validation(format!("secret derivation failed: {e}")))?;
    Ok(out)
}

/// Resolves login credentials to a subject id against the document store.
pub struct CredentialResolver {
    store: Arc<dyn DocumentStore>,
    iterations: u32,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn DocumentStore>, iterations: u32) -> Self {
        Self { store, iterations }
    }

    /// Hash a raw secret for account provisioning.
    pub fn hash_secret(&self, secret: &str) -> Result<SecretHash> {
        SecretHash::derive(secret, self.iterations)
    }

    /// Resolve (email, secret) to a subject id.
    ///
    /// Unknown email and bad secret are indistinguishable to the caller: both
    /// are `AuthFailed`.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Uuid> {
        let account = self.store.account_by_email(email).await?;
        match account {
            Some(account) if SecretHash::verify(&account.secret_hash, secret) => {
                tracing::debug!(subject = %account.id, "login succeeded");
                Ok(account.id)
            }
            _ => {
                tracing::warn!(email, "login failed");
                Err(PortalError::AuthFailed)
            }
        }
    }
}
