use crate::core::transport::Transport;
use crate::domain::model::UploadMeta;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Turns a local file into the upload meta the service expects as a layer
/// `source` or a style `file_upload`.
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, transport: &Transport, path: &Path) -> Result<UploadMeta>;
}
