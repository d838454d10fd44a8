//! # HTTP リクエストハンドラ
//!
//! - `todo`: `/todos` と `/todos/{id}` の CRUD
//!
//! ハンドラはリポジトリを直接呼び出す。業務ロジックがないため
//! ユースケース層は置かない。

pub mod todo;

pub use todo::{
    TodoPayload,
    TodoResponse,
    TodoState,
    create_todo,
    list_todos,
    method_not_allowed,
    todo_item,
};
