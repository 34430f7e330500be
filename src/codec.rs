//! Signing and verification of the session token.
//!
//! The cookie value is a compact JWT whose `data` claim carries the whole
//! session payload. This is primarily useful for issuing and inspecting
//! tokens outside the middleware, e.g. in tests.
//!
//! Note: the claim layout is considered an implementation detail and may
//! evolve.

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{config::JwtSessionConfig, error::Error};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default)]
    data: Value,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    // RFC 7519 allows `aud` to be a string or an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<Value>,
}

/// Turns session payloads into signed tokens and back.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age: i64,
    issuer: Option<String>,
    subject: Option<String>,
    audience: Option<String>,
}

impl TokenCodec {
    pub fn new(config: &JwtSessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        // The default 60s leeway would accept tokens past their window.
        validation.leeway = 0;
        // `Validation` checks `iss`/`aud`/`sub` only when the token carries
        // them; marking a configured claim required rejects tokens that
        // omit it.
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        if let Some(ref audience) = config.audience {
            validation.set_audience(&[audience]);
            validation.required_spec_claims.insert("aud".to_string());
        } else {
            // Only claims this configuration names are checked.
            validation.validate_aud = false;
        }
        if let Some(ref subject) = config.subject {
            validation.sub = Some(subject.clone());
            validation.required_spec_claims.insert("sub".to_string());
        }

        Self {
            header: Header::new(config.algorithm),
            validation,
            encoding_key,
            decoding_key,
            max_age: config.max_age,
            issuer: config.issuer.clone(),
            subject: config.subject.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Sign `data` into a token valid for the configured window.
    pub fn serialize(&self, data: &Value) -> Result<String, Error> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            data: data.clone(),
            iat,
            exp: iat + self.max_age,
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
            aud: self.audience.clone().map(Value::String),
        };

        jsonwebtoken::encode(&self.header, &claims, &self.encoding_key).map_err(Error::Sign)
    }

    /// Verify `token` and unwrap the payload it carries.
    ///
    /// Returns `None` for any token that does not verify: bad signature,
    /// wrong algorithm, expired, claim mismatch, malformed, or missing
    /// payload. Callers cannot tell these apart.
    pub fn deserialize(&self, token: &str) -> Option<Value> {
        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;
        let claims = token_data.claims;

        // Tokens carry the window they were issued under; enforce the
        // currently configured window regardless.
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let deadline = claims.iat.checked_add(self.max_age)?;
        if now >= deadline {
            return None;
        }

        if claims.data.is_null() {
            return None;
        }

        Some(claims.data)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
