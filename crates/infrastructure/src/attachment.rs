use async_trait::async_trait;
use domain::{ImageId, TodoError};
use shared::Config;

/// 画像 ID ごとに期限付きの PUT 用 URL を発行する
#[async_trait]
pub trait UploadUrlSigner: Send + Sync {
    async fn presign_put(&self, image_id: &ImageId) -> Result<String, TodoError>;
}

/// 添付ファイルの公開先 (`https://{bucket}.{domain}/{imageId}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLocation {
    pub bucket: String,
    pub domain: String,
}

impl AttachmentLocation {
    pub fn new(bucket: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: domain.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.attachment_bucket, &config.attachment_domain)
    }

    pub fn url_for(&self, image_id: &ImageId) -> String {
        attachment_url(&self.bucket, &self.domain, image_id)
    }
}

pub fn attachment_url(bucket: &str, domain: &str, image_id: &ImageId) -> String {
    format!("https://{bucket}.{domain}/{image_id}")
}

/// `get_upload_url` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    /// クライアントがファイルを PUT する署名付き URL
    pub upload_url: String,
    pub image_id: ImageId,
    /// ToDo の attachmentUrl に記録した URL
    pub attachment_url: String,
}
