use crate::core::client::{resource_path, NgwClient};
use crate::domain::model::ExportOptions;
use crate::utils::error::{NgwError, Result};
use reqwest::{Method, RequestBuilder};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

impl NgwClient {
    /// Exports a vector layer and writes the response body to `path`.
    pub async fn download_vector_layer(&self, path: &Path, layer_id: u64, options: ExportOptions) -> Result<u64> {
        let request = self
            .transport()
            .request(Method::GET, &format!("{}/export", resource_path(layer_id)))
            .query(&export_query(&options));
        tracing::info!(
            "📥 Exporting layer {} as {} (srs {}, zipped {}) to {}",
            layer_id,
            options.format.as_str(),
            options.srs,
            options.zipped,
            path.display()
        );
        self.download_to(request, path).await
    }

    pub async fn download_qgis_style(&self, path: &Path, style_id: u64) -> Result<u64> {
        let request = self
            .transport()
            .request(Method::GET, &format!("{}/qml", resource_path(style_id)));
        self.download_to(request, path).await
    }

    /// XYZ tile template for a style; `{x}`, `{y}` and `{z}` are left in place.
    pub fn tms_url(&self, style_id: u64) -> String {
        format!(
            "{}/api/component/render/tile?resource={}&x={{x}}&y={{y}}&z={{z}}",
            self.base_url(),
            style_id
        )
    }

    /// Streams the body to a sibling `.part` file chunk by chunk and moves it
    /// to `path` once complete. On any failure the partial file is removed
    /// and `path` is left as it was.
    async fn download_to(&self, request: RequestBuilder, path: &Path) -> Result<u64> {
        let mut response = self.transport().send(request).await?;
        let partial = partial_path(path);

        let outcome = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&partial, path).await?;
            Ok::<u64, NgwError>(written)
        }
        .await;

        match outcome {
            Ok(written) => {
                tracing::debug!("📥 Wrote {} bytes to {}", written, path.display());
                Ok(written)
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::warn!("⚠️  Could not remove {}: {}", partial.display(), cleanup);
                }
                Err(err)
            }
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn export_query(options: &ExportOptions) -> Vec<(&'static str, String)> {
    vec![
        ("format", options.format.as_str().to_string()),
        ("srs", options.srs.to_string()),
        ("zipped", options.zipped.to_string()),
        ("fid", "ngw_id".to_string()),
        ("encoding", "UTF-8".to_string()),
    ]
}
