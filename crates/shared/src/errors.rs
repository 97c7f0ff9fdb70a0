use crate::config::ConfigError;
use domain::TodoError;
use thiserror::Error;

/// 外側のレイヤーへ返すためのエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Todo error: {0}")]
    Todo(#[from] TodoError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}
