//! # Todo
//!
//! `todos` テーブルの 1 行に対応するエンティティ。
//!
//! ## ライフサイクル
//!
//! - 作成: `id` と `created_at` はデータベースが採番・設定する
//! - 更新: `title` / `description` / `priority` のみ上書き可能
//! - 削除: `id` 指定の物理削除（論理削除・履歴なし）
//!
//! `priority` は自由文字列で、列挙値の制約は設けない。

use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use thiserror::Error;

/// Todo の一意識別子
///
/// データベースのシーケンスでのみ採番される。
/// サービス側で新しい値を生成することはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{_0}")]
pub struct TodoId(i64);

impl TodoId {
    /// データベースから取得した値から ID を復元する
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    /// 内部の整数値を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// パスパラメータが 10 進整数として解釈できない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid ID")]
pub struct InvalidTodoId;

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    /// 10 進整数（符号付き可）をパースする
    ///
    /// 空文字列、数字以外を含む文字列、`i64` の範囲外はエラー。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|_| InvalidTodoId)
    }
}

/// 書き込み可能なフィールドの組
///
/// 作成・更新の両方で使用する。`id` と `created_at` は含まない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title:       String,
    pub description: String,
    pub priority:    String,
}

impl TodoDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            title:       title.into(),
            description: description.into(),
            priority:    priority.into(),
        }
    }
}

/// 永続化済みの Todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id:          TodoId,
    pub title:       String,
    pub description: String,
    pub priority:    String,
    pub created_at:  DateTime<Utc>,
}

impl Todo {
    /// 採番済みの ID と作成日時をドラフトに付与して Todo を組み立てる
    pub fn from_draft(id: TodoId, draft: TodoDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            created_at,
        }
    }
}
