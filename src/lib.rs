//! Stateless, signed-cookie sessions for `tower` services.
//!
//! This crate provides a layer that inserts a [`Session`] into request
//! extensions and persists the whole session payload into the cookie itself
//! as a signed JWT. There is no server-side store: any instance holding the
//! signing secret can read and issue sessions.
//!
//! On the way in, the configured cookie is verified and unwrapped into the
//! request's [`Session`]. On the way out, the session decides the cookie
//! write: a fresh or modified payload is signed and saved, an untouched
//! payload is re-signed so the expiry window slides with activity, and a
//! cleared session expires the cookie. A request that arrived without a
//! session and never wrote one sends nothing at all.
//!
//! # Security
//! The token is signed, not encrypted. Clients cannot modify the payload
//! without invalidating the signature, but they **can read it**: never put
//! secrets in the session payload. Tokens that fail verification for any
//! reason (bad signature, wrong algorithm, expired, claim mismatch,
//! malformed) are indistinguishable from an absent session.

pub mod codec;
mod config;
mod error;
pub mod layer;
mod session;

pub use jsonwebtoken::Algorithm;
pub use tower_cookies::cookie::SameSite;

pub use crate::codec::TokenCodec;
pub use crate::config::{
    DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE, JwtSessionConfig, RequestHead, Secure,
};
pub use crate::error::Error;
pub use crate::layer::JwtSessionManagerLayer;
pub use crate::session::Session;
