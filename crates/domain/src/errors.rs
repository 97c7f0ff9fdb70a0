use thiserror::Error;

/// ToDo データアクセス層のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Item conversion error: {0}")]
    Conversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TodoError::DynamoDb("PutItem failed: throttled".to_string());
        assert_eq!(error.to_string(), "DynamoDB error: PutItem failed: throttled");

        let error = TodoError::Storage("presign failed".to_string());
        assert_eq!(error.to_string(), "Object storage error: presign failed");
    }
}
