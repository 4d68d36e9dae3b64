use crate::core::client::NgwClient;
use crate::domain::payload::{
    NewResource, ResourceBody, WfsServiceBody, WfsServiceLayer, WmsServiceBody, WmsServiceLayer,
};
use crate::utils::error::{NgwError, Result};

pub const DEFAULT_WMS_NAME: &str = "autogenerated_wms_service";
pub const DEFAULT_WFS_NAME: &str = "autogenerated_wfs_service";

impl NgwClient {
    pub async fn create_wms(
        &self,
        group_id: u64,
        layers: Vec<WmsServiceLayer>,
        display_name: Option<&str>,
    ) -> Result<u64> {
        let resource = NewResource::new(
            group_id,
            Self::name_or(display_name, || DEFAULT_WMS_NAME.to_string()),
            ResourceBody::WmsService(WmsServiceBody { layers }),
        );
        self.create_resource(&resource).await
    }

    /// Publishes the top-level layers of a web map as a WMS service placed
    /// next to the web map. Each layer is keyed by its style id.
    pub async fn create_wms_from_webmap(&self, webmap_id: u64, display_name: Option<&str>) -> Result<u64> {
        let document = self.get_webmap(webmap_id).await?;
        let group_id = document.resource.parent_id().ok_or_else(|| {
            NgwError::precondition(format!("webmap {} has no parent group", webmap_id))
        })?;

        let layers = document
            .webmap
            .root_item
            .children
            .into_iter()
            .filter_map(|item| {
                item.layer_style_id.map(|style_id| WmsServiceLayer {
                    keyname: style_id.to_string(),
                    display_name: item.display_name,
                    resource_id: style_id,
                    min_scale_denom: None,
                    max_scale_denom: None,
                })
            })
            .collect();

        self.create_wms(group_id, layers, display_name).await
    }

    pub async fn create_wfs(
        &self,
        group_id: u64,
        layers: Vec<WfsServiceLayer>,
        display_name: Option<&str>,
    ) -> Result<u64> {
        let resource = NewResource::new(
            group_id,
            Self::name_or(display_name, || DEFAULT_WFS_NAME.to_string()),
            ResourceBody::WfsService(WfsServiceBody { layers }),
        );
        self.create_resource(&resource).await
    }
}
