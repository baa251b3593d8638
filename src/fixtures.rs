//! Placeholder identifiers for demos and tests
//!
//! Nothing produced here is verified. A fabricated identity is not an
//! authenticated account and a fabricated artifact hash does not address
//! any content; both only satisfy the shape that downstream code expects.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix of fabricated content identifiers
pub const ARTIFACT_HASH_PREFIX: &str = "Qm";

/// Number of random characters after the prefix
pub const ARTIFACT_HASH_BODY_LEN: usize = 44;

/// Produce a content-identifier-shaped placeholder: the two-character
/// prefix followed by 44 characters drawn uniformly from `[A-Za-z0-9]`.
pub fn fabricate_artifact_hash() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ARTIFACT_HASH_BODY_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", ARTIFACT_HASH_PREFIX, body)
}

/// Produce an account-style placeholder identity (`0x` + 40 hex digits).
pub fn fabricate_identity() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("0x{}", hex)
}
