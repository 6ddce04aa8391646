//! Per-panel nonce for the content security policy.

use std::fmt;

use rand::RngExt;

const NONCE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 32 characters from a 62-symbol alphabet (~190 bits)
const NONCE_LEN: usize = 32;

/// Opaque token scoping which inline `<style>`/`<script>` blocks may run.
///
/// Issued once per panel instance and reused for every render of that instance.
#[derive(Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Draw a fresh nonce from the thread-local CSPRNG
    pub fn issue() -> Self {
        let mut rng = rand::rng();
        let token = (0..NONCE_LEN)
            .map(|_| char::from(NONCE_CHARS[rng.random_range(0..NONCE_CHARS.len())]))
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep the token out of logs
impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(..)")
    }
}
