use crate::core::client::{resource_path, NgwClient};
use crate::domain::payload::{NewResource, QgisVectorStyleBody, ResourceBody};
use crate::utils::error::{NgwError, Result};
use serde_json::json;
use std::path::Path;

impl NgwClient {
    pub async fn create_raster_style(&self, layer_id: u64, display_name: Option<&str>) -> Result<u64> {
        let resource = NewResource::new(
            layer_id,
            Self::name_or_generated(display_name),
            ResourceBody::RasterStyle,
        );
        self.create_resource(&resource).await
    }

    /// Creates a QGIS style from a `.qml` file. Without a display name the
    /// file stem is used.
    pub async fn upload_qgis_style(&self, path: &Path, layer_id: u64, display_name: Option<&str>) -> Result<u64> {
        let name = match display_name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => file_stem(path)?,
        };
        tracing::info!("🎨 Uploading style {} to layer {} as '{}'", path.display(), layer_id, name);

        let file_upload = self.upload_file(path).await?;
        let body = ResourceBody::QgisVectorStyle(QgisVectorStyleBody { file_upload });
        self.create_resource(&NewResource::new(layer_id, name, body)).await
    }

    /// Swaps the `.qml` behind an existing style and returns the response body.
    pub async fn replace_qgis_style(&self, path: &Path, style_id: u64) -> Result<serde_json::Value> {
        tracing::info!("🎨 Replacing style {} with {}", style_id, path.display());
        let file_upload = self.upload_file(path).await?;
        let payload = json!({
            "qgis_vector_style": { "id": style_id, "file_upload": file_upload }
        });
        self.transport()
            .put_json(&resource_path(style_id), &payload)
            .await
    }

    /// Uploads `<qml_dir>/<display name>.qml` as a style for every child of
    /// the group and returns the new style ids.
    pub async fn upload_qmls_by_name(&self, group_id: u64, qml_dir: &Path) -> Result<Vec<u64>> {
        let children = self.get_child_resources(group_id).await?;
        let mut style_ids = Vec::with_capacity(children.len());

        for child in children {
            let layer = child.resource;
            let qml = qml_dir.join(format!("{}.qml", layer.display_name));
            tracing::debug!("🎨 {} '{}' -> {}", layer.id, layer.display_name, qml.display());
            style_ids.push(self.upload_qgis_style(&qml, layer.id, None).await?);
        }

        Ok(style_ids)
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| NgwError::precondition(format!("cannot derive a style name from {}", path.display())))
}
