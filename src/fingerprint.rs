//! Stable pseudonymous visitor identity.
//!
//! The fingerprint is a pure function of IP and user-agent with no per-run
//! salt, so repeated analyses of the same dataset produce comparable visitor
//! counts. Entries missing both fields collapse into one shared identity.

use sha2::{Digest, Sha256};
use std::fmt::Write;

const UNKNOWN: &str = "unknown";

/// Derive the visitor fingerprint for an IP / user-agent pair.
///
/// Missing or empty fields are substituted with `"unknown"` before hashing.
/// The result is the first 128 bits of SHA-256 over `"{ip}|{ua}"`, as
/// lowercase hex.
pub fn fingerprint(ip: Option<&str>, user_agent: Option<&str>) -> String {
    let ip = ip.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);
    let ua = user_agent.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);

    let digest = Sha256::digest(format!("{ip}|{ua}").as_bytes());
    let mut out = String::with_capacity(32);
    for byte in &digest[..16] {
        // infallible for String
        let _ = write!(out, "{byte:02x}");
    }
    out
}
