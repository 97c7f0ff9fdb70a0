use crate::attachment::UploadUrlSigner;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use domain::{ImageId, TodoError};
use shared::Config;
use std::time::Duration;
use tracing::debug;

/// S3 の署名付き PUT URL を発行する
#[derive(Clone)]
pub struct S3UploadUrlSigner {
    client: Client,
    bucket: String,
    expiration: Duration,
}

impl S3UploadUrlSigner {
    /// `s3_endpoint` があればパス形式のアドレスで上書きする (LocalStack 用)
    pub fn from_sdk_config(sdk_config: &SdkConfig, config: &Config) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::from_client(
            Client::from_conf(builder.build()),
            &config.attachment_bucket,
            config.signed_url_expiration,
        )
    }

    pub fn from_client(client: Client, bucket: impl Into<String>, expiration: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            expiration,
        }
    }
}

#[async_trait]
impl UploadUrlSigner for S3UploadUrlSigner {
    async fn presign_put(&self, image_id: &ImageId) -> Result<String, TodoError> {
        let presigning = PresigningConfig::expires_in(self.expiration)
            .map_err(|e| TodoError::Storage(format!("Invalid presigning config: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(image_id.as_str())
            .presigned(presigning)
            .await
            .map_err(|e| {
                TodoError::Storage(format!("PutObject presign failed: {}", DisplayErrorContext(&e)))
            })?;

        debug!(bucket = %self.bucket, image_id = %image_id, "署名付きURLを発行しました");
        Ok(request.uri().to_string())
    }
}
