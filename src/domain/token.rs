use md5::{Digest, Md5};
use uuid::Uuid;

use crate::domain::value::ApiKey;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One-time access token: `nonce + md5_hex(nonce + api_key)`.
///
/// Generated per call and never stored. The gateway enforces the validity window.
pub struct AccessToken {
    value: String,
    nonce_len: usize,
}

impl AccessToken {
    /// Length of the hex digest suffix.
    pub const DIGEST_LEN: usize = 32;

    /// Generate a token with a fresh random nonce.
    pub fn generate(api_key: &ApiKey) -> Self {
        let nonce = Uuid::new_v4().simple().to_string();
        Self::with_nonce(&nonce, api_key)
    }

    /// Derive the token for a known nonce.
    pub fn with_nonce(nonce: &str, api_key: &ApiKey) -> Self {
        let digest = Md5::digest(format!("{nonce}{}", api_key.as_str()).as_bytes());
        Self {
            value: format!("{nonce}{}", hex::encode(digest)),
            nonce_len: nonce.len(),
        }
    }

    pub fn nonce(&self) -> &str {
        &self.value[..self.nonce_len]
    }

    pub fn digest(&self) -> &str {
        &self.value[self.nonce_len..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ApiKey {
        ApiKey::new("key1").unwrap()
    }

    #[test]
    fn digest_is_md5_of_nonce_and_key() {
        let token = AccessToken::with_nonce("abc", &key());
        // md5("abckey1")
        let expected = hex::encode(Md5::digest(b"abckey1"));
        assert_eq!(token.nonce(), "abc");
        assert_eq!(token.digest(), expected);
        assert_eq!(token.as_str(), format!("abc{expected}"));
    }

    #[test]
    fn known_digest_vector() {
        let token = AccessToken::with_nonce("", &ApiKey::new("abc").unwrap());
        assert_eq!(token.digest(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let token = AccessToken::generate(&key());
        assert_eq!(token.digest().len(), AccessToken::DIGEST_LEN);
        assert!(
            token
                .digest()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn consecutive_tokens_differ() {
        let first = AccessToken::generate(&key());
        let second = AccessToken::generate(&key());
        assert_ne!(first.nonce(), second.nonce());
        assert_ne!(first, second);
    }

    #[test]
    fn generated_digest_matches_its_nonce() {
        let token = AccessToken::generate(&key());
        let rederived = AccessToken::with_nonce(token.nonce(), &key());
        assert_eq!(token, rederived);
    }
}
