//! # アプリケーション構築
//!
//! ルーターとミドルウェアの組み立てを担当する。
//! リポジトリは [`TodoState`] 経由で注入するため、テストではモックに差し替えられる。
//!
//! ## レイヤー構成（外側から）
//!
//! ```text
//! SetRequestId → Trace → PropagateRequestId → CanonicalLogLine → CORS → Router
//! ```

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use todo_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    cors::CorsSettings,
    handler::{TodoState, create_todo, list_todos, method_not_allowed, todo_item},
};

/// ルーターを構築する
///
/// `/todos/` 配下は fallback の [`todo_item`] で受け、パスの検証もそこで行う。
/// それ以外の未知のパスも同じ fallback に届き、404 になる。
///
/// `HEAD /todos` は GET ハンドラに回さず 405 を返す。
/// リクエストボディのサイズは制限しない。
pub fn build_app(state: Arc<TodoState>, cors: CorsSettings) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos)
                .head(method_not_allowed)
                .post(create_todo)
                .fallback(method_not_allowed),
        )
        .fallback(todo_item)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        .layer(cors.into_layer())
        .layer(CanonicalLogLineLayer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
