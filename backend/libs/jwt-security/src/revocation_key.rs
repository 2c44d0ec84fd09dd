//! Revocation key and lifetime derivation
//!
//! Claims are read from the JWT payload without checking the signature.
//! They only pick a storage key and an expiry, never an identity.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Upper bound for a revocation entry lifetime (access tokens live 1 hour).
pub const MAX_REVOCATION_TTL: Duration = Duration::from_secs(3600);

/// Lifetime for tokens that are already past `exp`, to cover clock skew.
pub const EXPIRED_TOKEN_REVOCATION_TTL: Duration = Duration::from_secs(300);

/// Storage key for `token`: `jti:<jti>` when the token is a JWT carrying a
/// non-empty `jti` claim, `sha256:<hex>` of the whole token otherwise.
pub fn revocation_key(token: &str) -> String {
    let jti = decode_claims(token).and_then(|claims| {
        claims
            .get("jti")
            .and_then(|v| v.as_str())
            .filter(|jti| !jti.is_empty())
            .map(str::to_owned)
    });

    match jti {
        Some(jti) => format!("jti:{}", jti),
        None => format!("sha256:{}", hex::encode(Sha256::digest(token.as_bytes()))),
    }
}

/// How long a revocation entry for `token` must live.
///
/// Time left until `exp`, capped at [`MAX_REVOCATION_TTL`]. Tokens without
/// `exp` get the cap; already expired tokens get
/// [`EXPIRED_TOKEN_REVOCATION_TTL`].
pub fn revocation_ttl(token: &str, now: DateTime<Utc>) -> Duration {
    let exp = decode_claims(token).and_then(|claims| claims.get("exp").and_then(|v| v.as_i64()));

    let Some(exp) = exp else {
        return MAX_REVOCATION_TTL;
    };

    // `exp` is client-controlled
    let remaining = exp.saturating_sub(now.timestamp());
    if remaining <= 0 {
        EXPIRED_TOKEN_REVOCATION_TTL
    } else {
        Duration::from_secs(remaining as u64).min(MAX_REVOCATION_TTL)
    }
}

fn decode_claims(token: &str) -> Option<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&payload).ok()?;
    claims.is_object().then_some(claims)
}
