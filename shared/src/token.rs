//! Opaque session tokens shaped like a JWT.
//!
//! Nothing here is cryptographic. The signature segment is a constant and no
//! consumer verifies it.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
pub const PLACEHOLDER_SIGNATURE: &str = "mock-signature";
/// 24 hours
pub const TOKEN_TTL_MS: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

/// Payload segment of a [`SessionToken`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiry as epoch milliseconds
    pub exp: i64,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode the payload segment. No signature or expiry check is made.
    pub fn claims(&self) -> Option<TokenClaims> {
        let mut segments = self.0.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return None,
        };
        let bytes = general_purpose::STANDARD.decode(payload).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issue a token for `user_id` expiring 24 hours from now
pub fn issue(user_id: &str) -> SessionToken {
    issue_at(user_id, Utc::now())
}

pub fn issue_at(user_id: &str, now: DateTime<Utc>) -> SessionToken {
    let exp = now.timestamp_millis() + TOKEN_TTL_MS;
    let payload = serde_json::json!({ "userId": user_id, "exp": exp }).to_string();

    let header = general_purpose::STANDARD.encode(HEADER);
    let payload = general_purpose::STANDARD.encode(payload);

    SessionToken(format!("{}.{}.{}", header, payload, PLACEHOLDER_SIGNATURE))
}
