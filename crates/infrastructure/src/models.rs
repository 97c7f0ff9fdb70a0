use aws_sdk_dynamodb::types::AttributeValue;
use domain::{TodoError, TodoId, TodoItem, UserId};
use std::collections::HashMap;

/// テーブルの属性名
pub const ATTR_USER_ID: &str = "userId";
pub const ATTR_TODO_ID: &str = "todoId";
pub const ATTR_CREATED_AT: &str = "createdAt";
pub const ATTR_NAME: &str = "name";
pub const ATTR_DUE_DATE: &str = "dueDate";
pub const ATTR_DONE: &str = "done";
pub const ATTR_ATTACHMENT_URL: &str = "attachmentUrl";

pub type AttributeMap = HashMap<String, AttributeValue>;

/// (userId, todoId) の主キーを生成
pub fn todo_key(user_id: &UserId, todo_id: &TodoId) -> AttributeMap {
    let mut key = HashMap::new();
    key.insert(
        ATTR_USER_ID.to_string(),
        AttributeValue::S(user_id.as_str().to_string()),
    );
    key.insert(
        ATTR_TODO_ID.to_string(),
        AttributeValue::S(todo_id.as_str().to_string()),
    );
    key
}

/// TodoItem を DynamoDB AttributeValue マップに変換
pub fn todo_to_item(todo: &TodoItem) -> AttributeMap {
    let mut map = todo_key(&todo.user_id, &todo.todo_id);

    if let Some(created_at) = &todo.created_at {
        map.insert(
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(created_at.clone()),
        );
    }

    map.insert(ATTR_NAME.to_string(), AttributeValue::S(todo.name.clone()));
    map.insert(
        ATTR_DUE_DATE.to_string(),
        AttributeValue::S(todo.due_date.clone()),
    );
    map.insert(ATTR_DONE.to_string(), AttributeValue::Bool(todo.done));

    if let Some(url) = &todo.attachment_url {
        map.insert(
            ATTR_ATTACHMENT_URL.to_string(),
            AttributeValue::S(url.clone()),
        );
    }

    map
}

/// DynamoDB AttributeValue マップから TodoItem を復元
pub fn item_to_todo(map: &AttributeMap) -> Result<TodoItem, TodoError> {
    // 書式は作成元に任せ、文字列のまま受け渡す
    let created_at = match map.get(ATTR_CREATED_AT) {
        Some(value) => Some(
            value
                .as_s()
                .map_err(|_| TodoError::Conversion(format!("{ATTR_CREATED_AT} is not a string")))?
                .clone(),
        ),
        None => None,
    };

    let done = map
        .get(ATTR_DONE)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| TodoError::Conversion(format!("Missing or invalid {ATTR_DONE}")))?;

    let attachment_url = map
        .get(ATTR_ATTACHMENT_URL)
        .and_then(|v| v.as_s().ok())
        .cloned();

    Ok(TodoItem {
        user_id: UserId::from_string(get_string(map, ATTR_USER_ID)?),
        todo_id: TodoId::from_string(get_string(map, ATTR_TODO_ID)?),
        created_at,
        name: get_string(map, ATTR_NAME)?,
        due_date: get_string(map, ATTR_DUE_DATE)?,
        done,
        attachment_url,
    })
}

fn get_string(map: &AttributeMap, key: &str) -> Result<String, TodoError> {
    map.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| TodoError::Conversion(format!("Missing or invalid {key}")))
}
