//! # Todo ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /todos` - 一覧（ID 昇順、ページングなし）
//! - `POST /todos` - 作成
//! - `PUT /todos/{id}` - 更新（存在しない ID でも 200）
//! - `DELETE /todos/{id}` - 削除（存在しない ID でも 204）
//!
//! 上記以外のメソッドは 405 を返す。`/todos/{id}` ではメソッドより先に
//! ID を検証するため、`PATCH /todos/abc` は 400 になる。
//!
//! ## リクエストボディ
//!
//! ボディは `Content-Type` に関係なく JSON として寛容にデコードする
//! （[`TodoPayload::decode_lenient`]）。不正な JSON で 400 を返すことはない。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use todo_domain::todo::{Todo, TodoDraft, TodoId};
use todo_infra::repository::TodoRepository;

use crate::error::TodoApiError;

/// ID 付きパスの接頭辞
const ITEM_PATH_PREFIX: &str = "/todos/";

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// リクエストボディで認識するキー
const PAYLOAD_KEYS: [&str; 5] = ["id", "title", "description", "priority", "created_at"];

/// Todo ハンドラの共有状態
pub struct TodoState {
    pub repository: Arc<dyn TodoRepository>,
}

// --- リクエスト/レスポンス型 ---

/// 作成・更新リクエストのボディ
///
/// すべてのフィールドが省略可能で、型が合わない値もデフォルト値として受け入れる。
/// `id` と `created_at` は作成時には無視され、更新時は `created_at` のみ
/// レスポンスにそのまま返される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub id:          i64,
    #[serde(default, deserialize_with = "lenient")]
    pub title:       String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub priority:    String,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at:  String,
}

/// フィールド単位の寛容なデシリアライズ
///
/// 値を一度 `serde_json::Value` として受け、目的の型に変換できなければ
/// デフォルト値にする（`null` や数値の `title` など）。
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl TodoPayload {
    /// リクエストボディをデコードする
    ///
    /// 先頭の JSON 値だけを読み、後続のバイト列は無視する。
    /// 空ボディ、構文エラー、オブジェクト以外の値はすべてデフォルト値になる。
    /// キーは大文字小文字を区別せずに照合する（`"Title"` も `title` になる）。
    pub fn decode_lenient(body: &[u8]) -> Self {
        let first = serde_json::Deserializer::from_slice(body)
            .into_iter::<serde_json::Value>()
            .next();

        match first {
            Some(Ok(serde_json::Value::Object(object))) => {
                Self::deserialize(serde_json::Value::Object(fold_keys(object)))
                    .unwrap_or_default()
            }
            Some(Err(e)) => {
                tracing::debug!(error = %e, "リクエストボディを JSON としてデコードできません");
                Self::default()
            }
            _ => Self::default(),
        }
    }

    fn to_draft(&self) -> TodoDraft {
        TodoDraft::new(&self.title, &self.description, &self.priority)
    }
}

/// 既知のキーを正規の表記に揃え、未知のキーは捨てる
///
/// 同じフィールドに対応するキーが複数ある場合は、後に照合したものが残る。
fn fold_keys(object: JsonObject) -> JsonObject {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            PAYLOAD_KEYS
                .iter()
                .find(|known| known.eq_ignore_ascii_case(&key))
                .map(|known| ((*known).to_owned(), value))
        })
        .collect()
}

/// Todo の JSON 表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id:          i64,
    pub title:       String,
    pub description: String,
    pub priority:    String,
    pub created_at:  String,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id:          todo.id.as_i64(),
            title:       todo.title,
            description: todo.description,
            priority:    todo.priority,
            created_at:  todo.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

// --- ハンドラ ---

/// GET /todos
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<Json<Vec<TodoResponse>>, TodoApiError> {
    let todos = state.repository.find_all().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// POST /todos
///
/// ボディの `id` / `created_at` は無視し、データベースが採番した値を返す。
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    body: Bytes,
) -> Result<Json<TodoResponse>, TodoApiError> {
    let payload = TodoPayload::decode_lenient(&body);
    let todo = state.repository.insert(&payload.to_draft()).await?;

    tracing::debug!(id = %todo.id, "Todo を作成しました");
    Ok(Json(TodoResponse::from(todo)))
}

/// `/todos` でサポートしていないメソッド
pub async fn method_not_allowed() -> TodoApiError {
    TodoApiError::MethodNotAllowed
}

/// PUT /todos/{id}, DELETE /todos/{id}
///
/// ルーターの fallback として登録し、`/todos/` 配下のすべてのパスを受ける。
/// パスは `/todos/<10 進整数>` に完全一致する必要があり、
/// 末尾の `/` や余分なセグメントは 400 になる。
pub async fn todo_item(
    State(state): State<Arc<TodoState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, TodoApiError> {
    let raw_id = uri
        .path()
        .strip_prefix(ITEM_PATH_PREFIX)
        .ok_or(TodoApiError::RouteNotFound)?;
    let id: TodoId = raw_id.parse()?;

    match method {
        Method::PUT => update_todo(&state, id, &body).await,
        Method::DELETE => delete_todo(&state, id).await,
        _ => Err(TodoApiError::MethodNotAllowed),
    }
}

/// 無条件に上書きし、送信された内容に `id` を設定して返す
async fn update_todo(
    state: &TodoState,
    id: TodoId,
    body: &[u8],
) -> Result<Response, TodoApiError> {
    let payload = TodoPayload::decode_lenient(body);
    let rows = state.repository.update(id, &payload.to_draft()).await?;

    if rows == 0 {
        tracing::debug!(%id, "更新対象の Todo がありません");
    }

    let response = TodoResponse {
        id:          id.as_i64(),
        title:       payload.title,
        description: payload.description,
        priority:    payload.priority,
        created_at:  payload.created_at,
    };
    Ok(Json(response).into_response())
}

/// 無条件に削除し、該当の有無にかかわらず 204 を返す
async fn delete_todo(state: &TodoState, id: TodoId) -> Result<Response, TodoApiError> {
    let rows = state.repository.delete(id).await?;

    if rows == 0 {
        tracing::debug!(%id, "削除対象の Todo がありません");
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}
