use sha2::{Digest, Sha256, Sha512};
use std::fmt::Write;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        },
    )
}

/// SHA-256 digest of `data` as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    to_hex(&Sha256::digest(data))
}

/// SHA-512 digest of `data` as a lowercase hex string
///
/// Admin API tokens are stored in the config file as this digest and
/// compared against the digest of the submitted token.
pub fn sha512_hex(data: &[u8]) -> String {
    to_hex(&Sha512::digest(data))
}
