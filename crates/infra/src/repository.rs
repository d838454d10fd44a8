//! # リポジトリ
//!
//! データアクセスのトレイトと PostgreSQL 実装を提供する。
//!
//! ハンドラはトレイト経由でのみデータベースにアクセスするため、
//! テストではインメモリ実装に差し替えられる。

pub mod todo_repository;

pub use todo_repository::{PostgresTodoRepository, TodoRepository};
