//! # リクエストサマリログ
//!
//! 1 リクエストにつき 1 行、メソッド・パス・ステータス・所要時間をまとめて出力する
//! tower Layer（[Canonical Log Lines](https://brandur.org/canonical-log-lines)）。
//!
//! TraceLayer の内側に置くことで、スパンの `request_id` が同じ行に載る:
//!
//! ```text
//! SetRequestId → Trace → CanonicalLogLine → handler
//! ```

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response, StatusCode, header};
use tower::{Layer, Service};

/// CORS レイヤーが応答するプリフライトは集計しない
fn is_preflight<B>(req: &Request<B>) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// リクエスト開始時に取得しておく情報
struct RequestSummary {
    method:  Method,
    path:    String,
    started: Instant,
}

impl RequestSummary {
    fn begin<B>(req: &Request<B>) -> Self {
        Self {
            method:  req.method().clone(),
            path:    req.uri().path().to_owned(),
            started: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn completed(self, status: StatusCode) {
        tracing::info!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.status_code = status.as_u16(),
            http.latency_ms = self.elapsed_ms(),
            "リクエスト完了"
        );
    }

    fn failed(self, error: &dyn Display) {
        tracing::error!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.latency_ms = self.elapsed_ms(),
            error.message = %error,
            "リクエスト処理エラー"
        );
    }
}

/// サマリログを出力する Layer
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みのインスタンスで呼び出す
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        let summary = (!is_preflight(&req)).then(|| RequestSummary::begin(&req));

        Box::pin(async move {
            let result = inner.call(req).await;
            if let Some(summary) = summary {
                match &result {
                    Ok(response) => summary.completed(response.status()),
                    Err(e) => summary.failed(e),
                }
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// 固定の結果を返すだけの Service
    #[derive(Clone)]
    struct Stub(Result<StatusCode, &'static str>);

    impl Service<Request<()>> for Stub {
        type Error = &'static str;
        type Future = BoxFuture<Result<Response<()>, &'static str>>;
        type Response = Response<()>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<()>) -> Self::Future {
            let outcome = self.0;
            Box::pin(async move {
                outcome.map(|status| {
                    let mut response = Response::new(());
                    *response.status_mut() = status;
                    response
                })
            })
        }
    }

    /// 1 イベント分のレベルとフィールド（`message` を含む）
    type Captured = (tracing::Level, BTreeMap<String, String>);

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Captured>>>);

    struct Fields<'a>(&'a mut BTreeMap<String, String>);

    impl tracing::field::Visit for Fields<'_> {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Recorder {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut fields = BTreeMap::new();
            event.record(&mut Fields(&mut fields));
            self.0.lock().unwrap().push((*event.metadata().level(), fields));
        }
    }

    /// 戻り値のガードが生きている間だけ記録する
    fn record_events() -> (tracing::subscriber::DefaultGuard, Recorder) {
        let recorder = Recorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (guard, recorder)
    }

    fn get(method: Method, path: &str) -> Request<()> {
        Request::builder().method(method).uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_完了時にinfoで1行出力する() {
        let (_guard, recorder) = record_events();
        let mut sut = CanonicalLogLineLayer.layer(Stub(Ok(StatusCode::NO_CONTENT)));

        let response = sut.call(get(Method::DELETE, "/todos/3")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        let (level, fields) = &events[0];
        assert_eq!(*level, tracing::Level::INFO);
        assert_eq!(fields["message"], "リクエスト完了");
        assert_eq!(fields["log.type"], "canonical");
        assert_eq!(fields["http.method"], "DELETE");
        assert_eq!(fields["http.path"], "/todos/3");
        assert_eq!(fields["http.status_code"], "204");
        assert!(fields.contains_key("http.latency_ms"));
    }

    #[tokio::test]
    async fn test_プリフライトは出力しない() {
        let (_guard, recorder) = record_events();
        let mut sut = CanonicalLogLineLayer.layer(Stub(Ok(StatusCode::OK)));
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/todos")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(())
            .unwrap();

        sut.call(preflight).await.unwrap();

        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_プリフライトでないoptionsは出力する() {
        let (_guard, recorder) = record_events();
        let mut sut = CanonicalLogLineLayer.layer(Stub(Ok(StatusCode::METHOD_NOT_ALLOWED)));

        sut.call(get(Method::OPTIONS, "/todos")).await.unwrap();

        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_serviceエラーはerrorで出力する() {
        let (_guard, recorder) = record_events();
        let mut sut = CanonicalLogLineLayer.layer(Stub(Err("boom")));

        let result = sut.call(get(Method::POST, "/todos")).await;

        assert_eq!(result.unwrap_err(), "boom");
        let events = recorder.0.lock().unwrap();
        let (level, fields) = &events[0];
        assert_eq!(*level, tracing::Level::ERROR);
        assert_eq!(fields["message"], "リクエスト処理エラー");
        assert_eq!(fields["error.message"], "boom");
    }
}
