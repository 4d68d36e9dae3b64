//! File uploads: a single `PUT` for small files and the tus resumable
//! protocol for large ones.

use crate::config::{UploadMode, UploadSettings};
use crate::core::transport::Transport;
use crate::domain::model::UploadMeta;
use crate::domain::ports::FileUploader;
use crate::utils::error::{NgwError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, Response};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use url::Url;

pub const UPLOAD_PATH: &str = "/api/component/file_upload/upload";
pub const TUS_PATH: &str = "/api/component/file_upload/";
const TUS_VERSION: &str = "1.0.0";

pub fn uploader_for(settings: &UploadSettings) -> Arc<dyn FileUploader> {
    match settings.mode {
        UploadMode::Direct => Arc::new(DirectUpload),
        UploadMode::Resumable => Arc::new(ResumableUpload::new(settings.chunk_size)),
        UploadMode::Auto => Arc::new(AutoUpload {
            threshold: settings.resumable_threshold,
            resumable: ResumableUpload::new(settings.chunk_size),
        }),
    }
}

/// Whole file in one `PUT` request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectUpload;

#[async_trait]
impl FileUploader for DirectUpload {
    async fn upload(&self, transport: &Transport, path: &Path) -> Result<UploadMeta> {
        let data = tokio::fs::read(path).await?;
        tracing::debug!("📤 Uploading {} ({} bytes) in one request", path.display(), data.len());

        let response = transport
            .send(transport.request(Method::PUT, UPLOAD_PATH).body(data))
            .await?;
        Ok(response.json().await?)
    }
}

/// tus 1.0.0 upload, one `PATCH` per chunk.
#[derive(Debug, Clone, Copy)]
pub struct ResumableUpload {
    chunk_size: usize,
}

impl ResumableUpload {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    async fn create(&self, transport: &Transport, length: u64) -> Result<String> {
        let request = transport
            .request(Method::POST, TUS_PATH)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Upload-Length", length.to_string());
        let response = transport.send(request).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| NgwError::UploadProtocol {
                message: "upload creation response has no Location header".to_string(),
            })?;
        resolve_location(transport.base_url(), location)
    }
}

#[async_trait]
impl FileUploader for ResumableUpload {
    async fn upload(&self, transport: &Transport, path: &Path) -> Result<UploadMeta> {
        let mut file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let location = self.create(transport, length).await?;
        tracing::debug!("📤 Resumable upload of {} ({} bytes) at {}", path.display(), length, location);

        let mut buffer = vec![0u8; self.chunk_size];
        let mut offset = 0u64;
        while offset < length {
            let read = fill_buffer(&mut file, &mut buffer).await?;
            if read == 0 {
                return Err(NgwError::UploadProtocol {
                    message: format!("{} ended at byte {} of {}", path.display(), offset, length),
                });
            }

            let request = transport
                .request_url(Method::PATCH, &location)
                .header("Tus-Resumable", TUS_VERSION)
                .header("Upload-Offset", offset.to_string())
                .header(CONTENT_TYPE, "application/offset+octet-stream")
                .body(buffer[..read].to_vec());
            let response = transport.send(request).await?;

            let expected = offset + read as u64;
            let reported = upload_offset(&response)?;
            if reported != expected {
                return Err(NgwError::UploadProtocol {
                    message: format!("server acknowledged offset {}, expected {}", reported, expected),
                });
            }
            offset = reported;
            tracing::debug!("📤 {}/{} bytes sent", offset, length);
        }

        let response = transport
            .send(transport.request_url(Method::GET, &location))
            .await?;
        Ok(response.json().await?)
    }
}

/// Direct below `threshold` bytes, resumable from it on.
#[derive(Debug, Clone, Copy)]
pub struct AutoUpload {
    pub threshold: u64,
    pub resumable: ResumableUpload,
}

#[async_trait]
impl FileUploader for AutoUpload {
    async fn upload(&self, transport: &Transport, path: &Path) -> Result<UploadMeta> {
        let size = tokio::fs::metadata(path).await?.len();
        if size >= self.threshold {
            self.resumable.upload(transport, path).await
        } else {
            DirectUpload.upload(transport, path).await
        }
    }
}

fn resolve_location(base_url: &str, location: &str) -> Result<String> {
    let base = Url::parse(base_url).map_err(|e| NgwError::ConfigError {
        message: format!("invalid base URL {}: {}", base_url, e),
    })?;
    let resolved = base.join(location).map_err(|e| NgwError::UploadProtocol {
        message: format!("invalid Location header {}: {}", location, e),
    })?;
    // Credentials go out with every chunk, so the upload must stay on the
    // configured origin.
    if resolved.origin() != base.origin() {
        return Err(NgwError::UploadProtocol {
            message: format!("Location {} is outside {}", resolved, base_url),
        });
    }
    Ok(resolved.to_string())
}

fn upload_offset(response: &Response) -> Result<u64> {
    response
        .headers()
        .get("Upload-Offset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| NgwError::UploadProtocol {
            message: "chunk response has no valid Upload-Offset header".to_string(),
        })
}

/// Reads until the buffer is full or the file ends.
async fn fill_buffer(file: &mut tokio::fs::File, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
