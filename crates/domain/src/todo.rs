use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ToDo の所有者 (パーティションキー)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ユーザー内で ToDo を識別する ID (ソートキー)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 添付ファイルのオブジェクトキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テーブルに保存される ToDo アイテム
///
/// `(user_id, todo_id)` がキー。属性名は既存テーブルに合わせて camelCase。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub user_id: UserId,
    pub todo_id: TodoId,
    /// 作成日時。保存されている文字列をそのまま保持する
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl TodoItem {
    /// 作成リクエストから新しい ToDo を組み立てる
    ///
    /// `todo_id` は新規採番、`done` は `false`、添付なし。
    pub fn new(user_id: UserId, request: CreateTodoRequest) -> Self {
        Self {
            user_id,
            todo_id: TodoId::new(),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            name: request.name,
            due_date: request.due_date,
            done: false,
            attachment_url: None,
        }
    }

    /// 更新リクエストの内容で可変フィールドを上書きする
    pub fn apply(&mut self, request: &UpdateTodoRequest) {
        self.name = request.name.clone();
        self.due_date = request.due_date.clone();
        self.done = request.done;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

/// ToDo の可変フィールド (name, dueDate, done) をまとめて上書きするリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}
