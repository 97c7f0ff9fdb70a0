use async_trait::async_trait;
use domain::{TodoError, TodoId, TodoItem, UpdateTodoRequest, UserId};

/// ToDo テーブルへの単発操作
///
/// 各メソッドはストアへのリクエスト 1 回に対応する。リトライはしない。
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// パーティションキーが `user_id` の全アイテムをストアの並び順で返す
    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError>;

    /// キー全体で挿入 (既存なら上書き)
    async fn put(&self, todo: &TodoItem) -> Result<(), TodoError>;

    /// name / dueDate / done を上書き。存在チェックはしない
    async fn update_fields(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<(), TodoError>;

    /// attachmentUrl を上書き。存在チェックはしない
    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        attachment_url: &str,
    ) -> Result<(), TodoError>;

    /// 存在しなくてもエラーにしない
    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), TodoError>;
}
