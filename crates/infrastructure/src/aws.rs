use aws_config::{BehaviorVersion, Region, SdkConfig};
use shared::Config;

/// 設定のリージョンで AWS SDK の共通設定を読み込む
/// 認証情報はデフォルトのプロバイダーチェーンから取得
pub async fn load_sdk_config(config: &Config) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await
}
