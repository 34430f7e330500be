// Cookie attribute mapping: every configured attribute shows up on the
// emitted cookie, and everything left unset is omitted from the wire.
mod common;

use axum::{Extension, Router, body::Body, routing::get};
use http::Request;
use serde_json::json;
use time::Duration;
use tower::ServiceExt as _;
use tower_jwt_session::{JwtSessionConfig, SameSite, Secure, Session};

fn routes() -> Router {
    Router::new().route(
        "/set",
        get(|Extension(session): Extension<Session>| async move {
            session
                .set(json!({"foo": 42}))
                .expect("session set succeeds");
        }),
    )
}

async fn set_cookie(config: JwtSessionConfig) -> tower_cookies::Cookie<'static> {
    set_cookie_with_request(config, Request::builder()).await
}

async fn set_cookie_with_request(
    config: JwtSessionConfig,
    req: http::request::Builder,
) -> tower_cookies::Cookie<'static> {
    let req = req
        .uri("/set")
        .body(Body::empty())
        .expect("request builds successfully");
    let res = routes()
        .layer(common::make_layer(config))
        .oneshot(req)
        .await
        .expect("service call succeeds");
    common::get_session_cookie(&res)
}

#[tokio::test]
async fn default_cookie_name() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET)).await;

    assert_eq!(cookie.name(), "session");
}

#[tokio::test]
async fn custom_cookie_name() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_name("my.sid")).await;

    assert_eq!(cookie.name(), "my.sid");
}

#[tokio::test]
async fn http_only_by_default() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET)).await;

    assert_eq!(cookie.http_only(), Some(true));
}

#[tokio::test]
async fn http_only_disabled() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_http_only(false)).await;

    assert_eq!(cookie.http_only(), None);
}

#[tokio::test]
async fn same_site_omitted_by_default() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET)).await;

    assert_eq!(cookie.same_site(), None);
}

#[tokio::test]
async fn same_site_strict() {
    let cookie =
        set_cookie(JwtSessionConfig::new(common::SECRET).with_same_site(SameSite::Strict)).await;

    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
}

#[tokio::test]
async fn same_site_lax() {
    let cookie =
        set_cookie(JwtSessionConfig::new(common::SECRET).with_same_site(SameSite::Lax)).await;

    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
}

#[tokio::test]
async fn same_site_none() {
    let cookie =
        set_cookie(JwtSessionConfig::new(common::SECRET).with_same_site(SameSite::None)).await;

    assert_eq!(cookie.same_site(), Some(SameSite::None));
}

#[tokio::test]
async fn path_attribute() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_path("/foo/bar")).await;

    assert_eq!(cookie.path(), Some("/foo/bar"));
}

#[tokio::test]
async fn domain_attribute() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_domain("example.com")).await;

    assert_eq!(cookie.domain(), Some("example.com"));
}

#[tokio::test]
async fn max_age_attribute() {
    // Exercise: a custom lifetime.
    // Expectation: the cookie Max-Age and the token window agree.
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_max_age(600)).await;

    assert_eq!(cookie.max_age(), Some(Duration::seconds(600)));

    let claims = common::decode_claims(cookie.value(), common::SECRET);
    let window = claims["exp"].as_i64().expect("exp claim is an integer")
        - claims["iat"].as_i64().expect("iat claim is an integer");
    assert_eq!(window, 600);
}

#[tokio::test]
async fn static_secure_enabled() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_secure(true)).await;

    assert_eq!(cookie.secure(), Some(true));
}

#[tokio::test]
async fn static_secure_disabled() {
    let cookie = set_cookie(JwtSessionConfig::new(common::SECRET).with_secure(false)).await;

    assert_eq!(cookie.secure(), None);
}

#[tokio::test]
async fn dynamic_secure_follows_the_request() {
    // Exercise: decide the Secure attribute from X-Forwarded-Proto, the way
    // a deployment behind a TLS-terminating proxy would.
    // Expectation: the predicate sees each request and the attribute follows.
    let config = || {
        JwtSessionConfig::new(common::SECRET).with_secure(Secure::dynamic(|head| {
            head.headers
                .get("x-forwarded-proto")
                .is_some_and(|proto| proto == "https")
        }))
    };

    let cookie = set_cookie_with_request(
        config(),
        Request::builder().header("x-forwarded-proto", "https"),
    )
    .await;
    assert_eq!(cookie.secure(), Some(true));

    let cookie = set_cookie_with_request(
        config(),
        Request::builder().header("x-forwarded-proto", "http"),
    )
    .await;
    assert_eq!(cookie.secure(), None);

    let cookie = set_cookie_with_request(config(), Request::builder()).await;
    assert_eq!(cookie.secure(), None);
}
