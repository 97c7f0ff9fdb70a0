use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// トレーシングサブスクライバーを初期化
/// ログレベルは `RUST_LOG` で制御し、未設定時は `info`
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 構造化ログ出力でCloudWatchに送信
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_target(false).json(), // JSON形式でCloudWatchに出力
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_only_once() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
