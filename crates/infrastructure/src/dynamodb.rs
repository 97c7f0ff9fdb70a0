use crate::models::{item_to_todo, todo_key, todo_to_item, AttributeMap};
use crate::store::TodoStore;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use domain::{TodoError, TodoId, TodoItem, UpdateTodoRequest, UserId};
use shared::Config;
use std::fmt::Debug;
use tracing::{debug, error};

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    /// 読み込み済みの SDK 設定から作成。`dynamodb_endpoint` があれば上書きする
    pub fn from_sdk_config(sdk_config: &SdkConfig, config: &Config) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::from_client(Client::from_conf(builder.build()), &config.todos_table)
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// SDK エラーを操作名付きの TodoError に変換
pub fn convert_error<E, R>(operation: &str, err: SdkError<E, R>) -> TodoError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug,
{
    TodoError::DynamoDb(format!("{operation} failed: {}", DisplayErrorContext(&err)))
}

/// DynamoDB の ToDo テーブル
#[derive(Clone)]
pub struct DynamoDbTodoStore {
    db: DynamoDbClient,
}

impl DynamoDbTodoStore {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }

    async fn query_page(
        &self,
        user_id: &UserId,
        start_key: Option<AttributeMap>,
    ) -> Result<(Vec<AttributeMap>, Option<AttributeMap>), TodoError> {
        let output = self
            .db
            .client()
            .query()
            .table_name(self.db.table_name())
            .key_condition_expression("userId = :userId")
            .expression_attribute_values(":userId", AttributeValue::S(user_id.as_str().to_string()))
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| convert_error("Query", e))?;

        Ok((output.items.unwrap_or_default(), output.last_evaluated_key))
    }
}

#[async_trait]
impl TodoStore for DynamoDbTodoStore {
    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        let mut todos = Vec::new();
        let mut start_key = None;

        loop {
            let (items, last_key) = self.query_page(user_id, start_key).await?;

            for item in &items {
                match item_to_todo(item) {
                    Ok(todo) => todos.push(todo),
                    Err(e) => {
                        // attachmentUrl だけが書かれたキーなど
                        error!(user_id = %user_id, error = %e, "ToDoアイテムの変換に失敗したためスキップします");
                    }
                }
            }

            match last_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(user_id = %user_id, count = todos.len(), "ToDoクエリ完了");
        Ok(todos)
    }

    async fn put(&self, todo: &TodoItem) -> Result<(), TodoError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .send()
            .await
            .map_err(|e| convert_error("PutItem", e))?;

        Ok(())
    }

    async fn update_fields(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<(), TodoError> {
        self.db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression("SET #name = :name, dueDate = :dueDate, done = :done")
            // name は予約語
            .expression_attribute_names("#name", "name")
            .expression_attribute_values(":name", AttributeValue::S(request.name.clone()))
            .expression_attribute_values(":dueDate", AttributeValue::S(request.due_date.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(request.done))
            .send()
            .await
            .map_err(|e| convert_error("UpdateItem", e))?;

        Ok(())
    }

    async fn set_attachment_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        attachment_url: &str,
    ) -> Result<(), TodoError> {
        self.db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression("SET attachmentUrl = :attachmentUrl")
            .expression_attribute_values(
                ":attachmentUrl",
                AttributeValue::S(attachment_url.to_string()),
            )
            .send()
            .await
            .map_err(|e| convert_error("UpdateItem", e))?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<(), TodoError> {
        self.db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .send()
            .await
            .map_err(|e| convert_error("DeleteItem", e))?;

        Ok(())
    }
}
