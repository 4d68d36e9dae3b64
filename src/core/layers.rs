use crate::core::client::{resource_path, NgwClient};
use crate::core::transport::id_from_response;
use crate::domain::model::{Extent, ResourceRef};
use crate::domain::payload::{
    NewResource, PostgisConnectionBody, PostgisLayerBody, RasterLayerBody, ResourceBody, SrsRef,
    VectorLayerBody, WmsConnectionBody, WmsLayerBody,
};
use crate::utils::error::Result;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

#[derive(Deserialize)]
struct ExtentResponse {
    extent: Extent,
}

impl NgwClient {
    /// Creates a vector layer from a GeoJSON file or a zipped shapefile.
    pub async fn upload_vector_layer(&self, path: &Path, group_id: u64, display_name: Option<&str>) -> Result<u64> {
        let name = Self::name_or_generated(display_name);
        tracing::info!("📤 Uploading vector layer {} as '{}'", path.display(), name);
        let source = self.upload_file(path).await?;

        let body = ResourceBody::VectorLayer(VectorLayerBody {
            source,
            srs: SrsRef::default(),
        });
        self.create_resource(&NewResource::new(group_id, name, body)).await
    }

    /// Creates a raster layer from a file. No style is created for it.
    pub async fn upload_raster_layer(&self, path: &Path, group_id: u64, display_name: Option<&str>) -> Result<u64> {
        let name = Self::name_or_generated(display_name);
        tracing::info!("📤 Uploading raster layer {} as '{}'", path.display(), name);
        let source = self.upload_file(path).await?;

        let body = ResourceBody::RasterLayer(RasterLayerBody {
            source,
            srs: SrsRef::default(),
        });
        self.create_resource(&NewResource::new(group_id, name, body)).await
    }

    pub async fn create_postgis_connection(
        &self,
        group_id: u64,
        display_name: Option<&str>,
        connection: PostgisConnectionBody,
    ) -> Result<u64> {
        let resource = NewResource::new(
            group_id,
            Self::name_or_generated(display_name),
            ResourceBody::PostgisConnection(connection),
        );
        self.create_resource(&resource).await
    }

    /// `layer` carries the table and column settings; see
    /// [`PostgisLayerBody::new`] for the defaults.
    pub async fn create_postgis_layer(
        &self,
        layer: PostgisLayerBody,
        group_id: u64,
        display_name: Option<&str>,
    ) -> Result<u64> {
        let resource = NewResource::new(
            group_id,
            Self::name_or_generated(display_name),
            ResourceBody::PostgisLayer(layer),
        );
        self.create_resource(&resource).await
    }

    pub async fn create_wms_connection(
        &self,
        group_id: u64,
        display_name: Option<&str>,
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<u64> {
        let body = WmsConnectionBody {
            url: url.to_string(),
            version: "1.1.1".to_string(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        };
        let resource = NewResource::new(
            group_id,
            Self::name_or_generated(display_name),
            ResourceBody::WmsConnection(body),
        );
        self.create_resource(&resource).await
    }

    /// `wmslayers` is the comma-separated layer list of the remote WMS.
    pub async fn create_wms_layer(
        &self,
        connection_id: u64,
        wmslayers: &str,
        group_id: u64,
        display_name: Option<&str>,
    ) -> Result<u64> {
        let body = WmsLayerBody {
            connection: ResourceRef { id: connection_id },
            wmslayers: wmslayers.to_string(),
            imgformat: "image/png".to_string(),
            srs: SrsRef::default(),
        };
        let resource = NewResource::new(
            group_id,
            Self::name_or_generated(display_name),
            ResourceBody::WmsLayer(body),
        );
        self.create_resource(&resource).await
    }

    /// Adds one feature; `geom` is WKT in the layer's SRS.
    pub async fn create_vector_feature(
        &self,
        layer_id: u64,
        geom: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<u64> {
        let payload = json!({ "geom": geom, "fields": fields });
        let path = format!("{}/feature/", resource_path(layer_id));
        let response: serde_json::Value = self.transport().post_json(&path, &payload).await?;
        id_from_response(&response)
    }

    /// `None` when the service does not report `total_count`.
    pub async fn get_feature_count(&self, resource_id: u64) -> Result<Option<u64>> {
        let path = format!("{}/feature_count", resource_path(resource_id));
        let response: serde_json::Value = self.transport().get_json(&path).await?;
        Ok(response.get("total_count").and_then(serde_json::Value::as_u64))
    }

    pub async fn get_layer_extent(&self, resource_id: u64) -> Result<Extent> {
        let path = format!("{}/extent", resource_path(resource_id));
        let response: ExtentResponse = self.transport().get_json(&path).await?;
        Ok(response.extent)
    }
}
