//! Salted password hashing.
//!
//! Every credential is stored as a bcrypt digest computed with an explicit,
//! per-user random salt that is kept next to the digest. The salt is replaced
//! whenever the password changes, so [`CredentialCodec::set_password`] is the
//! only way new credential material should be produced.
//!
//! Verification reads cost and salt back out of the stored digest, so raising
//! the configured cost only affects credentials written afterwards.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let codec = CredentialCodec::new(bcrypt::DEFAULT_COST);
//! let credential = codec.set_password("secret1");
//! assert!(codec.verify("secret1", &credential.salt, &credential.hash));
//! ```

use base64::{Engine as _, engine::general_purpose};
use bcrypt::{Version, hash_with_salt};
use rand::RngCore;

const SALT_LEN: usize = 16;

/// Fresh salt and digest produced together for one password.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential {
    pub salt: String,
    pub hash: String,
}

impl std::fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedCredential").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CredentialCodec {
    cost: u32,
}

impl CredentialCodec {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Generates a new random salt, base64 encoded.
    pub fn make_salt(&self) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        general_purpose::STANDARD.encode(salt)
    }

    /// Hashes `plaintext` with `salt`.
    ///
    /// Returns an empty string when there is nothing usable to hash (empty
    /// plaintext or a malformed salt). Callers treat an empty digest as "no
    /// credential".
    pub fn hash(&self, plaintext: &str, salt: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }
        let Some(salt) = decode_salt(salt) else {
            return String::new();
        };

        match hash_with_salt(plaintext, self.cost, salt) {
            Ok(parts) => parts.format_for_version(Version::TwoB),
            Err(e) => {
                tracing::warn!("Password hashing failed: {}", e);
                String::new()
            }
        }
    }

    /// Checks `plaintext` against a stored digest.
    ///
    /// An empty digest, empty plaintext or unusable salt never verifies.
    pub fn verify(&self, plaintext: &str, salt: &str, expected: &str) -> bool {
        if expected.is_empty() || plaintext.is_empty() || decode_salt(salt).is_none() {
            return false;
        }

        match bcrypt::verify(plaintext, expected) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Password verification failed: {}", e);
                false
            }
        }
    }

    /// Produces a new salt and the matching digest for a password change.
    pub fn set_password(&self, plaintext: &str) -> HashedCredential {
        let salt = self.make_salt();
        let hash = self.hash(plaintext, &salt);
        HashedCredential { salt, hash }
    }
}

fn decode_salt(salt: &str) -> Option<[u8; SALT_LEN]> {
    general_purpose::STANDARD.decode(salt).ok()?.try_into().ok()
}
