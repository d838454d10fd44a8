//! # Todo インフラ層
//!
//! PostgreSQL との接続とデータアクセスを担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール作成
//! - **リポジトリ実装**: `todos` テーブルに対するパラメータ化 SQL の実行
//! - **エラー定義**: ドライバのエラーを [`InfraError`] に包んで呼び出し経路を記録
//!
//! ## 依存関係
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続プール
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - `mock` - インメモリのモックリポジトリ（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use todo_infra::{db, repository::PostgresTodoRepository};
//!
//! let pool = db::create_pool("postgres://localhost/todo").await?;
//! let repository = PostgresTodoRepository::new(pool);
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
