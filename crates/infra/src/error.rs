//! # インフラ層エラー
//!
//! [`InfraError`] は種別 [`InfraErrorKind`] と、生成時点のスパン階層
//! （[`SpanTrace`]）を持つ。
//!
//! `Display` はドライバが返したメッセージだけを出力し、接頭辞は付けない。
//! HTTP 層はこの文字列を 500 レスポンスのボディとして返す。

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// データベース操作の失敗
///
/// スパン階層を記録するには subscriber に `tracing_error::ErrorLayer` が必要。
#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// sqlx が返したエラー（接続失敗、テーブル未作成、タイムアウトなど）
    #[error("{0}")]
    Database(#[source] sqlx::Error),

    #[error("{0}")]
    Unexpected(String),
}

impl InfraError {
    fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(message.into()))
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(e: sqlx::Error) -> Self {
        Self::new(InfraErrorKind::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    #[test]
    fn test_生成時のスパンが記録される() {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        let span = tracing::debug_span!("find_all_todos");
        let _entered = span.enter();

        let err = InfraError::from(sqlx::Error::PoolClosed);

        assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
        let trace = err.span_trace().to_string();
        assert!(trace.contains("find_all_todos"), "span_trace: {trace}");
    }

    #[test]
    fn test_データベースエラーはドライバのメッセージのみ表示する() {
        let driver_message = sqlx::Error::PoolTimedOut.to_string();

        let err = InfraError::from(sqlx::Error::PoolTimedOut);

        assert_eq!(err.to_string(), driver_message);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unexpectedはメッセージのみ表示しsourceを持たない() {
        let err = InfraError::unexpected("connection refused");

        assert_eq!(err.to_string(), "connection refused");
        assert!(err.source().is_none());
    }
}
