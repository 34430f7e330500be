#![allow(dead_code)]

// Shared helpers for integration tests.
//
// These helpers intentionally use `tower_cookies::Cookie` parsing/encoding to match what the
// middleware emits in `Set-Cookie` and what browsers send back in `Cookie`.
use axum::body::Body;
use http::{HeaderMap, Response, header};
use http_body_util::BodyExt as _;
use serde_json::Value;
use tower_cookies::Cookie;
use tower_jwt_session::{JwtSessionConfig, JwtSessionManagerLayer};

pub const SECRET: &str = "an integration test signing secret";

pub fn make_layer(config: JwtSessionConfig) -> JwtSessionManagerLayer {
    JwtSessionManagerLayer::new(config)
}

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn get_session_cookie(res: &Response<Body>) -> Cookie<'static> {
    // Parse the `Set-Cookie` header into a `Cookie` structure.
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn set_cookie_count(headers: &HeaderMap) -> usize {
    headers.get_all(header::SET_COOKIE).iter().count()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    // Encode a cookie for use in a `Cookie` request header.
    cookie.encoded().to_string()
}

pub fn decode_claims(token: &str, secret: &str) -> Value {
    // Decode a session token into its raw claim set, verifying the signature
    // but none of the registered claims.
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<Value>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .expect("session token decodes successfully")
    .claims
}
