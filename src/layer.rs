use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::CookieManager;
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    codec::TokenCodec,
    config::{JwtSessionConfig, RequestHead, Secure},
    session::{Session, SessionAction},
};

#[derive(Debug, Clone)]
pub struct JwtSessionManagerLayer {
    config: JwtSessionConfig,
    codec: TokenCodec,
}

impl JwtSessionManagerLayer {
    #[must_use]
    pub fn new(config: JwtSessionConfig) -> Self {
        let codec = TokenCodec::new(&config);
        Self { config, codec }
    }
}

#[derive(Debug, Clone)]
pub struct JwtSessionManager<S> {
    inner: S,
    config: JwtSessionConfig,
    codec: TokenCodec,
}

impl<S> Layer<S> for JwtSessionManagerLayer {
    type Service = CookieManager<JwtSessionManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(JwtSessionManager {
            inner,
            config: self.config.clone(),
            codec: self.codec.clone(),
        })
    }
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for JwtSessionManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let config = self.config.clone();
        let codec = self.codec.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let cookies = match req.extensions().get::<tower_cookies::Cookies>().cloned() {
                Some(cookies) => cookies,
                None => {
                    let mut res = Response::default();
                    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                    return Ok(res);
                }
            };

            let loaded = match cookies.get(&config.name) {
                Some(cookie) => {
                    let payload = codec.deserialize(cookie.value());
                    if payload.is_none() {
                        tracing::warn!(cookie = %config.name, "session cookie failed verification");
                    }
                    payload
                }
                None => None,
            };

            // Only a dynamic predicate ever looks at the request head.
            let request_head = match &config.secure {
                Secure::Dynamic(_) => Some(RequestHead::from_request(&req)),
                Secure::Static(_) => None,
            };

            let session = Session::new(loaded);
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            match session.finalize() {
                SessionAction::Noop => {}
                SessionAction::Save(payload) | SessionAction::Touch(payload) => {
                    let secure = config.secure.resolve(request_head.as_ref());
                    match codec.serialize(&payload) {
                        Ok(token) => cookies.add(config.session_cookie(token, secure)),
                        Err(err) => {
                            tracing::error!(err = %err, "session token signing failed");
                            let mut res = Response::default();
                            *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                            return Ok(res);
                        }
                    }
                }
                SessionAction::Destroy => {
                    let secure = config.secure.resolve(request_head.as_ref());
                    cookies.add(config.removal_cookie(secure));
                }
            }

            Ok(res)
        })
    }
}
