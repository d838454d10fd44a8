//! # Todo ドメイン層
//!
//! Todo API が扱う唯一のエンティティ `Todo` と、その識別子・書き込み用の値を定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::todo::{TodoDraft, TodoId};
//!
//! let id: TodoId = "42".parse().unwrap();
//! assert_eq!(id.as_i64(), 42);
//!
//! let draft = TodoDraft::new("買い物", "牛乳と卵", "low");
//! assert_eq!(draft.title, "買い物");
//! ```

pub mod todo;

pub use todo::{InvalidTodoId, Todo, TodoDraft, TodoId};
