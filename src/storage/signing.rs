//! Request signing for the Cloudinary upload API
//!
//! Signed requests carry a `signature` computed as:
//!
//! ```text
//! hex( DIGEST( "k1=v1&k2=v2" + api_secret ) )
//! ```
//!
//! where the pairs are sorted by key and `DIGEST` is SHA-1 or SHA-256
//! depending on the account setting. Empty values, the file itself and the
//! routing fields (`api_key`, `resource_type`, `cloud_name`) are not signed.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::SignatureAlgorithm;

/// Parameters that are sent but never part of the string to sign
const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "resource_type", "cloud_name"];

/// Build the canonical `k=v&k=v` string for a set of parameters
pub fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut signed: Vec<&(&str, String)> = params
        .iter()
        .filter(|(key, value)| !value.is_empty() && !UNSIGNED_PARAMS.contains(key))
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    signed
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign parameters with the API secret, returning a lowercase hex digest
///
/// # Example
/// ```
/// use media_relay::config::SignatureAlgorithm;
/// use media_relay::storage::signing::sign_params;
///
/// let params = [("timestamp", "1315060510".to_string())];
/// let signature = sign_params(&params, "secret", SignatureAlgorithm::Sha1);
/// assert_eq!(signature.len(), 40); // SHA-1 produces 20 bytes = 40 hex chars
/// ```
pub fn sign_params(
    params: &[(&str, String)],
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let payload = format!("{}{}", string_to_sign(params), api_secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}
