//! # Todo Service エラー定義
//!
//! ハンドラで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## レスポンス形式
//!
//! エラーボディはプレーンテキストだが、`Content-Type` は `application/json` を返す。
//!
//! | エラー | ステータス | ボディ |
//! |--------|-----------|--------|
//! | `InvalidId` | 400 | `Invalid ID` |
//! | `MethodNotAllowed` | 405 | `Method not allowed` |
//! | `RouteNotFound` | 404 | `404 page not found`（`text/plain`） |
//! | `Database` | 500 | ドライバのエラーメッセージそのもの |

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::InvalidTodoId;
use todo_infra::InfraError;

/// Todo Service で発生するエラー
#[derive(Debug, Error)]
pub enum TodoApiError {
    /// パスの ID が 10 進整数でない
    #[error("Invalid ID")]
    InvalidId,

    /// ルートが対応していないメソッド
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `/todos` 配下以外のパス
    #[error("404 page not found")]
    RouteNotFound,

    /// データベースエラー
    #[error("{0}")]
    Database(#[from] InfraError),
}

impl From<InvalidTodoId> for TodoApiError {
    fn from(_: InvalidTodoId) -> Self {
        Self::InvalidId
    }
}

impl TodoApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let content_type = match &self {
            Self::RouteNotFound => "text/plain; charset=utf-8",
            Self::Database(e) => {
                tracing::error!(
                    error.message = %e,
                    error.span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                "application/json"
            }
            Self::InvalidId | Self::MethodNotAllowed => "application/json",
        };

        (
            self.status(),
            [(header::CONTENT_TYPE, content_type)],
            self.to_string(),
        )
            .into_response()
    }
}
