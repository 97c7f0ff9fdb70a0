use crate::models::{
    item_to_todo, todo_key, todo_to_item, AttributeMap, ATTR_ATTACHMENT_URL, ATTR_DONE,
    ATTR_DUE_DATE, ATTR_NAME,
};
use crate::store::TodoStore;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{TodoError, TodoId, TodoItem, UpdateTodoRequest, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

type Key = (String, String);

/// テスト・ローカル開発用のインメモリストア
///
/// DynamoDB と同じく属性マップのまま保持するため、update による部分アイテムの
/// 生成や、キー順 (ソートキー昇順) の並びも同じになる。
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    items: Arc<RwLock<BTreeMap<Key, AttributeMap>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// true の間、すべての書き込みを DynamoDb エラーで失敗させる
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// true の間、クエリを DynamoDb エラーで失敗させる
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 保持しているアイテム数 (部分アイテムを含む)
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn check_writable(&self, operation: &str) -> Result<(), TodoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TodoError::DynamoDb(format!(
                "{operation} failed: injected write failure"
            )));
        }
        Ok(())
    }

    async fn merge(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        attributes: Vec<(&str, AttributeValue)>,
    ) {
        let mut items = self.items.write().await;
        let item = items
            .entry(key_of(user_id, todo_id))
            .or_insert_with(|| todo_key(user_id, todo_id));

        for (name, value) in attributes {
            item.insert(name.to_string(), value);
        }
    }
}

fn key_of(user_id: &UserId, todo_id: &TodoId) -> Key {
    (user_id.as_str().to_string(), todo_id.as_str().to_string())
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TodoError::DynamoDb(
                "Query failed: injected read failure".to_string(),
            ));
        }

        let items = self.items.read().await;

        let todos = items
            .iter()
            .filter(|((user, _), _)| user == user_id.as_str())
            .filter_map(|(_, item)| match item_to_todo(item) {
                Ok(todo) => Some(todo),
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "ToDoアイテムの変換に失敗したためスキップします");
                    None
                }
            })
            .collect();

        Ok(todos)
    }

    async fn put(&self, todo: &TodoItem) -> Result<(), TodoError> {
        self.check_writable("PutItem")?;

        let mut items = self.items.write().await;
        items.insert(key_of(&todo.user_id, &todo.todo_id), todo_to_item(todo));
        Ok(())
    }

    async fn update_fields(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<(), TodoError> {
        self.check_writable("UpdateItem")?;

        self.merge(
            user_id,
            todo_id,
            vec![
                (ATTR_NAME, AttributeValue::S(request.name.clone())),
                (ATTR_DUE_DATE, AttributeValue::S(request.due_date.clone())),
                (ATTR_DONE, AttributeValue::Bool(request.done)),
            ],
        )
        .await;
        Ok(())
    }

    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        attachment_url: &str,
    ) -> Result<(), TodoError> {
        self.check_writable("UpdateItem")?;

        self.merge(
            user_id,
            todo_id,
            vec![(
                ATTR_ATTACHMENT_URL,
                AttributeValue::S(attachment_url.to_string()),
            )],
        )
        .await;
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), TodoError> {
        self.check_writable("DeleteItem")?;

        let mut items = self.items.write().await;
        items.remove(&key_of(user_id, todo_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(user: &str, id: &str, name: &str) -> TodoItem {
        TodoItem {
            user_id: UserId::from(user),
            todo_id: TodoId::from(id),
            created_at: None,
            name: name.to_string(),
            due_date: "2024-01-01".to_string(),
            done: false,
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn test_query_is_scoped_and_ordered_by_sort_key() {
        let store = InMemoryTodoStore::new();
        store.put(&todo("u1", "t2", "second")).await.unwrap();
        store.put(&todo("u2", "t1", "other user")).await.unwrap();
        store.put(&todo("u1", "t1", "first")).await.unwrap();

        let todos = store.query_by_user(&UserId::from("u1")).await.unwrap();
        let names: Vec<_> = todos.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);

        assert!(store
            .query_by_user(&UserId::from("nobody"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites_full_item() {
        let store = InMemoryTodoStore::new();
        let mut item = todo("u1", "t1", "first");
        item.attachment_url = Some("https://bucket.s3.amazonaws.com/a".to_string());
        store.put(&item).await.unwrap();

        store.put(&todo("u1", "t1", "replaced")).await.unwrap();

        let todos = store.query_by_user(&UserId::from("u1")).await.unwrap();
        assert_eq!(todos, vec![todo("u1", "t1", "replaced")]);
    }

    #[tokio::test]
    async fn test_update_on_missing_item_creates_it() {
        let store = InMemoryTodoStore::new();
        let request = UpdateTodoRequest {
            name: "upserted".to_string(),
            due_date: "2024-02-01".to_string(),
            done: true,
        };

        store
            .update_fields(&UserId::from("u1"), &TodoId::from("t9"), &request)
            .await
            .unwrap();

        let todos = store.query_by_user(&UserId::from("u1")).await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].name, "upserted");
        assert!(todos[0].done);
        assert!(todos[0].created_at.is_none());
    }

    #[tokio::test]
    async fn test_attachment_on_missing_item_is_not_listed() {
        let store = InMemoryTodoStore::new();
        store
            .set_attachment_url(
                &UserId::from("u1"),
                &TodoId::from("ghost"),
                "https://bucket.s3.amazonaws.com/img",
            )
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store
            .query_by_user(&UserId::from("u1"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = InMemoryTodoStore::new();
        store.fail_writes(true);

        let result = store.put(&todo("u1", "t1", "first")).await;
        assert!(matches!(result, Err(TodoError::DynamoDb(msg)) if msg.starts_with("PutItem")));
        assert!(store.is_empty().await);

        store.fail_writes(false);
        store.put(&todo("u1", "t1", "first")).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_injected_read_failure() {
        let store = InMemoryTodoStore::new();
        store.put(&todo("u1", "t1", "first")).await.unwrap();
        store.fail_reads(true);

        let result = store.query_by_user(&UserId::from("u1")).await;
        assert!(matches!(result, Err(TodoError::DynamoDb(msg)) if msg.starts_with("Query")));

        // 書き込みには影響しない
        store.put(&todo("u1", "t2", "second")).await.unwrap();

        store.fail_reads(false);
        assert_eq!(store.query_by_user(&UserId::from("u1")).await.unwrap().len(), 2);
    }
}
