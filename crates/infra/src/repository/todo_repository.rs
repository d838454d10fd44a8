//! # TodoRepository
//!
//! `todos` テーブルの永続化を担当するリポジトリ。
//!
//! すべての操作は単一のパラメータ化 SQL 文で完結する。
//! トランザクション、リトライ、存在確認は行わない。
//!
//! `id` は `INTEGER` / `BIGINT`、`created_at` は `TIMESTAMP` / `TIMESTAMPTZ` の
//! いずれの列型でも読めるよう、取得時に `bigint` / `timestamptz` へキャストする。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use todo_domain::todo::{Todo, TodoDraft, TodoId};

use crate::error::InfraError;

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 全件を ID の昇順で取得する
    ///
    /// フィルタ・ページングなし。0 件の場合は空の `Vec` を返す。
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

    /// 新しい Todo を作成する
    ///
    /// `id` と `created_at` はデータベースが採番した値を使う。
    async fn insert(&self, draft: &TodoDraft) -> Result<Todo, InfraError>;

    /// 指定 ID の Todo を上書きする
    ///
    /// # 戻り値
    ///
    /// - `Ok(rows)`: 更新された行数（該当なしの 0 も成功とみなす）
    /// - `Err(_)`: データベースエラー
    async fn update(&self, id: TodoId, draft: &TodoDraft) -> Result<u64, InfraError>;

    /// 指定 ID の Todo を削除する
    ///
    /// # 戻り値
    ///
    /// - `Ok(rows)`: 削除された行数（該当なしの 0 も成功とみなす）
    /// - `Err(_)`: データベースエラー
    async fn delete(&self, id: TodoId) -> Result<u64, InfraError>;
}

/// `todos` テーブルの行
///
/// テキスト列は NULL 許容のテーブルでも読めるよう `Option` で受け、
/// NULL は空文字列として扱う。
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id:          i64,
    title:       Option<String>,
    description: Option<String>,
    priority:    Option<String>,
    created_at:  DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id:          TodoId::from_i64(row.id),
            title:       row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            priority:    row.priority.unwrap_or_default(),
            created_at:  row.created_at,
        }
    }
}

/// PostgreSQL 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id::bigint AS id, title, description, priority,
                   created_at::timestamptz AS created_at
            FROM todos
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, draft: &TodoDraft) -> Result<Todo, InfraError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO todos (title, description, priority)
            VALUES ($1, $2, $3)
            RETURNING id::bigint, created_at::timestamptz
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(Todo::from_draft(
            TodoId::from_i64(id),
            draft.clone(),
            created_at,
        ))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn update(&self, id: TodoId, draft: &TodoDraft) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $1, description = $2, priority = $3
            WHERE id = $4
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.priority)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: TodoId) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresTodoRepository>();
        assert_send_sync::<Box<dyn TodoRepository>>();
    }

    #[test]
    fn test_行からtodoに変換できる() {
        let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let row = TodoRow {
            id: 7,
            title: Some("A".to_string()),
            description: Some("B".to_string()),
            priority: Some("low".to_string()),
            created_at,
        };

        let todo = Todo::from(row);

        assert_eq!(todo.id, TodoId::from_i64(7));
        assert_eq!(todo.title, "A");
        assert_eq!(todo.description, "B");
        assert_eq!(todo.priority, "low");
        assert_eq!(todo.created_at, created_at);
    }

    #[test]
    fn test_nullのテキスト列は空文字列になる() {
        let row = TodoRow {
            id:          1,
            title:       None,
            description: None,
            priority:    None,
            created_at:  DateTime::from_timestamp(0, 0).unwrap(),
        };

        let todo = Todo::from(row);

        assert_eq!(todo.title, "");
        assert_eq!(todo.description, "");
        assert_eq!(todo.priority, "");
    }
}
