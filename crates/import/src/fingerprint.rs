use sha2::{Digest, Sha256};

/// Content fingerprint of an uploaded statement (SHA-256, lowercase hex), for
/// duplicate detection upstream.
pub fn fingerprint(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}
