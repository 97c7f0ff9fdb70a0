use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SIGNED_URL_EXPIRATION_SECS: u64 = 300;
pub const DEFAULT_ATTACHMENT_DOMAIN: &str = "s3.amazonaws.com";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// データアクセス層の設定
///
/// 構築時に明示的に渡す。環境変数からの読み込みは [`Config::from_env`] で行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// ToDo テーブル名 (`TODOS_TABLE`)
    pub todos_table: String,
    /// 添付ファイル用バケット名 (`ATTACHMENT_S3_BUCKET`)
    pub attachment_bucket: String,
    /// 添付 URL のホスト部に使うドメイン (`ATTACHMENT_S3_DOMAIN`)
    pub attachment_domain: String,
    /// 署名付きアップロード URL の有効期間 (`SIGNED_URL_EXPIRATION`, 秒)
    pub signed_url_expiration: Duration,
    pub aws_region: String,
    /// DynamoDB Local などのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    /// LocalStack などのエンドポイント上書き
    pub s3_endpoint: Option<String>,
}

impl Config {
    pub fn new(todos_table: impl Into<String>, attachment_bucket: impl Into<String>) -> Self {
        Self {
            todos_table: todos_table.into(),
            attachment_bucket: attachment_bucket.into(),
            attachment_domain: DEFAULT_ATTACHMENT_DOMAIN.to_string(),
            signed_url_expiration: Duration::from_secs(DEFAULT_SIGNED_URL_EXPIRATION_SECS),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            dynamodb_endpoint: None,
            s3_endpoint: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let signed_url_expiration = match lookup("SIGNED_URL_EXPIRATION") {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid {
                        key: "SIGNED_URL_EXPIRATION",
                        value: value.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SIGNED_URL_EXPIRATION_SECS),
        };

        Ok(Config {
            todos_table: required("TODOS_TABLE")?,
            attachment_bucket: required("ATTACHMENT_S3_BUCKET")?,
            attachment_domain: lookup("ATTACHMENT_S3_DOMAIN")
                .unwrap_or_else(|| DEFAULT_ATTACHMENT_DOMAIN.to_string()),
            signed_url_expiration,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT"),
            s3_endpoint: lookup("S3_ENDPOINT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_required_values_and_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "Todos-dev"),
            ("ATTACHMENT_S3_BUCKET", "todo-attachments-dev"),
        ]))
        .unwrap();

        assert_eq!(config, Config::new("Todos-dev", "todo-attachments-dev"));
        assert_eq!(config.signed_url_expiration, Duration::from_secs(300));
        assert_eq!(config.attachment_domain, "s3.amazonaws.com");
        assert!(config.dynamodb_endpoint.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "Todos-dev"),
            ("ATTACHMENT_S3_BUCKET", "todo-attachments-dev"),
            ("SIGNED_URL_EXPIRATION", "60"),
            ("AWS_REGION", "ap-northeast-1"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
        ]))
        .unwrap();

        assert_eq!(config.signed_url_expiration, Duration::from_secs(60));
        assert_eq!(config.aws_region, "ap-northeast-1");
        assert_eq!(config.dynamodb_endpoint.as_deref(), Some("http://localhost:8000"));
        assert!(config.s3_endpoint.is_none());
    }

    #[test]
    fn test_missing_table() {
        let result = Config::from_lookup(lookup_from(&[("ATTACHMENT_S3_BUCKET", "bucket")]));
        assert_eq!(result, Err(ConfigError::Missing("TODOS_TABLE")));

        let result = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "Todos-dev"),
            ("ATTACHMENT_S3_BUCKET", "  "),
        ]));
        assert_eq!(result, Err(ConfigError::Missing("ATTACHMENT_S3_BUCKET")));
    }

    #[test]
    fn test_invalid_expiration() {
        let result = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "Todos-dev"),
            ("ATTACHMENT_S3_BUCKET", "bucket"),
            ("SIGNED_URL_EXPIRATION", "five minutes"),
        ]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                key: "SIGNED_URL_EXPIRATION",
                value: "five minutes".to_string(),
            })
        );
    }
}
