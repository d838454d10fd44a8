//! # Todo 共有ユーティリティ
//!
//! ログ・トレーシングなど、ビジネスロジックを含まない横断的な処理を提供する。
//!
//! - [`observability`] - トレーシング初期化、リクエストスパン、Request ID 生成
//! - `canonical_log` - リクエスト完了サマリログの tower Layer（`observability` feature）

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod observability;
