//! # テスト用モックリポジトリ
//!
//! ハンドラテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use todo_domain::todo::{Todo, TodoDraft, TodoId};

use crate::{error::InfraError, repository::TodoRepository};

#[derive(Default)]
struct MockState {
    todos:     Vec<Todo>,
    last_id:   i64,
    fail_with: Option<String>,
}

/// インメモリの TodoRepository
///
/// ID はシーケンスと同様に 1 から単調増加で採番する。
/// [`fail_with`](MockTodoRepository::fail_with) を設定すると、
/// 以降のすべての操作がそのメッセージの [`InfraError`] を返す。
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    state: Arc<Mutex<MockState>>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の操作をすべて失敗させる
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().unwrap().fail_with = Some(message.into());
    }

    /// 保存されている Todo のスナップショットを返す
    pub fn todos(&self) -> Vec<Todo> {
        self.state.lock().unwrap().todos.clone()
    }

    fn check_failure(state: &MockState) -> Result<(), InfraError> {
        match &state.fail_with {
            Some(message) => Err(InfraError::unexpected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        let state = self.state.lock().unwrap();
        Self::check_failure(&state)?;

        let mut todos = state.todos.clone();
        todos.sort_by_key(|t| t.id);
        Ok(todos)
    }

    async fn insert(&self, draft: &TodoDraft) -> Result<Todo, InfraError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;

        state.last_id += 1;
        let todo = Todo::from_draft(TodoId::from_i64(state.last_id), draft.clone(), Utc::now());
        state.todos.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, draft: &TodoDraft) -> Result<u64, InfraError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;

        let mut rows = 0;
        for todo in state.todos.iter_mut().filter(|t| t.id == id) {
            todo.title = draft.title.clone();
            todo.description = draft.description.clone();
            todo.priority = draft.priority.clone();
            rows += 1;
        }
        Ok(rows)
    }

    async fn delete(&self, id: TodoId) -> Result<u64, InfraError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;

        let before = state.todos.len();
        state.todos.retain(|t| t.id != id);
        Ok((before - state.todos.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_insertはidを単調増加で採番する() {
        let sut = MockTodoRepository::new();

        let first = sut.insert(&TodoDraft::new("A", "", "")).await.unwrap();
        let second = sut.insert(&TodoDraft::new("B", "", "")).await.unwrap();

        assert_eq!(first.id, TodoId::from_i64(1));
        assert_eq!(second.id, TodoId::from_i64(2));
    }

    #[tokio::test]
    async fn test_deleteで採番済みidは再利用されない() {
        let sut = MockTodoRepository::new();
        let first = sut.insert(&TodoDraft::default()).await.unwrap();

        sut.delete(first.id).await.unwrap();
        let second = sut.insert(&TodoDraft::default()).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_存在しないidの更新と削除は0件() {
        let sut = MockTodoRepository::new();

        let updated = sut.update(TodoId::from_i64(99), &TodoDraft::default()).await.unwrap();
        let deleted = sut.delete(TodoId::from_i64(99)).await.unwrap();

        assert_eq!(updated, 0);
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_fail_with設定後はエラーを返す() {
        let sut = MockTodoRepository::new();
        sut.fail_with("connection refused");

        let err = sut.find_all().await.unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
    }
}
