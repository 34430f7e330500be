use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use serde::{Deserialize, Serialize};
use tower_jwt_session::{JwtSessionConfig, JwtSessionManagerLayer, SameSite, Session};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Counter {
    n: usize,
}

async fn index(Extension(session): Extension<Session>) -> String {
    let Counter { n } = session
        .get()
        .expect("session payload deserializes successfully")
        .unwrap_or_default();
    session
        .set(Counter { n: n + 1 })
        .expect("session payload serializes successfully");
    format!("n={n}")
}

#[tokio::main]
async fn main() {
    let session_config = JwtSessionConfig::new("load this from your environment")
        // Default: "session"
        .with_name("session")
        // Default: true
        .with_http_only(true)
        // Default: no SameSite attribute
        .with_same_site(SameSite::Strict)
        // Default: 86400 (one day)
        .with_max_age(3600)
        // Default: false (use a Secure::dynamic predicate behind a TLS proxy)
        .with_secure(false)
        // Default: "/"
        .with_path("/");
    let session_layer = JwtSessionManagerLayer::new(session_config);

    let app = Router::new().route("/", get(index)).layer(session_layer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
