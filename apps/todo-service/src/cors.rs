//! # CORS 設定
//!
//! ブラウザのフロントエンドからのアクセスを許可するオリジンは固定のリストで、
//! 環境変数からは変更できない。
//!
//! tower-http の `CorsLayer` は `OPTIONS` をすべてプリフライトとして応答するため、
//! [`PreflightCorsLayer`] で包み、`Access-Control-Request-Method` を持たない
//! `OPTIONS` はルーターに渡す（405 / 400 になる）。

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::http::{HeaderName, HeaderValue, Method, Request, Response, header};
use tower::{Layer, Service};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// 許可するオリジン（ローカル開発 2 件 + 公開フロントエンド）
pub const ALLOWED_ORIGINS: [&str; 3] = [
    "https://matlewan.github.io",
    "http://127.0.0.1:3000",
    "http://localhost:3000",
];

/// CORS 設定
#[derive(Debug, Clone)]
pub struct CorsSettings {
    pub allowed_origins:   Vec<HeaderValue>,
    pub allowed_methods:   Vec<Method>,
    pub allowed_headers:   Vec<HeaderName>,
    pub allow_credentials: bool,
}

impl CorsSettings {
    /// フロントエンド向けの固定設定
    pub fn default_allowed() -> Self {
        Self {
            allowed_origins:   ALLOWED_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect(),
            allowed_methods:   vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allowed_headers:   vec![header::CONTENT_TYPE],
            allow_credentials: true,
        }
    }

    /// ルーターに適用する Layer に変換する
    pub fn into_layer(self) -> PreflightCorsLayer {
        PreflightCorsLayer {
            cors: CorsLayer::new()
                .allow_origin(AllowOrigin::list(self.allowed_origins))
                .allow_methods(self.allowed_methods)
                .allow_headers(self.allowed_headers)
                .allow_credentials(self.allow_credentials),
        }
    }
}

/// `Access-Control-Request-Method` 付きの `OPTIONS` だけがプリフライト
fn is_preflight<B>(req: &Request<B>) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// プリフライト以外の `OPTIONS` を CORS 処理から外す Layer
#[derive(Debug, Clone)]
pub struct PreflightCorsLayer {
    cors: CorsLayer,
}

impl<S> Layer<S> for PreflightCorsLayer {
    type Service = PreflightCorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PreflightCorsService {
            cors: self.cors.clone(),
            inner,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreflightCorsService<S> {
    cors:  CorsLayer,
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for PreflightCorsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        if req.method() == Method::OPTIONS && !is_preflight(&req) {
            return Box::pin(inner.call(req));
        }

        let mut cors = self.cors.layer(inner);
        Box::pin(cors.call(req))
    }
}
