use crate::core::client::{resource_path, NgwClient};
use crate::core::ordering::sort_layers_by_list;
use crate::domain::model::{
    NameSource, ResourceClass, ResourceInfo, WebmapData, WebmapDocument, WebmapItem, WebmapRootItem,
};
use crate::domain::payload::{NewResource, ResourceBody, WebmapBody};
use crate::utils::error::{NgwError, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_LAYER_ADAPTER: &str = "tile";

/// Any resource document; `webmap` is only present on web maps.
#[derive(Deserialize)]
struct RawDocument {
    resource: ResourceInfo,
    webmap: Option<WebmapData>,
}

impl NgwClient {
    pub async fn get_webmap(&self, webmap_id: u64) -> Result<WebmapDocument> {
        let raw: RawDocument = self.transport().get_json(&resource_path(webmap_id)).await?;
        if raw.resource.cls != ResourceClass::Webmap {
            return Err(NgwError::precondition(format!(
                "resource {} is a {}, not a webmap",
                webmap_id, raw.resource.cls
            )));
        }
        let webmap = raw.webmap.ok_or_else(|| NgwError::missing_field("webmap"))?;
        Ok(WebmapDocument {
            resource: raw.resource,
            webmap,
        })
    }

    /// Style ids referenced by the top-level layers of a web map.
    pub async fn get_styles_from_webmap_top(&self, webmap_id: u64) -> Result<Vec<u64>> {
        let document = self.get_webmap(webmap_id).await?;
        Ok(document
            .webmap
            .root_item
            .children
            .iter()
            .filter_map(|item| item.layer_style_id)
            .collect())
    }

    /// One web-map entry per vector layer of the group that has a QGIS style.
    /// Layers without a style are skipped; with several styles the last one
    /// listed wins.
    pub async fn get_layers_for_webmap(
        &self,
        group_id: u64,
        name_source: NameSource,
        layer_adapter: &str,
    ) -> Result<Vec<WebmapItem>> {
        let children = self.get_child_resources(group_id).await?;
        let mut items = Vec::new();

        for layer in children.into_iter().map(|item| item.resource) {
            if layer.cls != ResourceClass::VectorLayer {
                continue;
            }

            let style = self
                .get_child_resources(layer.id)
                .await?
                .into_iter()
                .map(|item| item.resource)
                .filter(|r| r.cls == ResourceClass::QgisVectorStyle)
                .last();

            let Some(style) = style else {
                tracing::debug!("Skipping layer {} '{}': no QGIS style", layer.id, layer.display_name);
                continue;
            };

            let name = match name_source {
                NameSource::Layer => layer.display_name,
                NameSource::Style => style.display_name,
            };
            items.push(WebmapItem::layer(name, style.id, layer_adapter));
        }

        Ok(items)
    }

    pub async fn create_webmap(
        &self,
        group_id: u64,
        children: Vec<WebmapItem>,
        display_name: Option<&str>,
    ) -> Result<u64> {
        let name = Self::name_or(display_name, || format!("map {}", Self::generate_name()));
        let resource = NewResource::new(group_id, name, ResourceBody::Webmap(WebmapBody::new(children)));
        self.create_resource(&resource).await
    }

    pub async fn create_webmap_from_group(
        &self,
        group_id: u64,
        display_name: Option<&str>,
        layer_adapter: &str,
    ) -> Result<u64> {
        let children = self
            .get_layers_for_webmap(group_id, NameSource::Layer, layer_adapter)
            .await?;
        tracing::info!("🗺️  Building web map of {} layers from group {}", children.len(), group_id);
        self.create_webmap(group_id, children, display_name).await
    }

    /// Reorders the top-level entries of a web map by display name; see
    /// [`sort_layers_by_list`].
    pub async fn webmap_reorder_layers_by_list<S: AsRef<str>>(&self, webmap_id: u64, orderlist: &[S]) -> Result<()> {
        let document = self.get_webmap(webmap_id).await?;
        let reordered = sort_layers_by_list(document.webmap.root_item.children, orderlist)?;

        let payload = json!({ "webmap": { "root_item": WebmapRootItem::new(reordered) } });
        let request = self
            .transport()
            .request(Method::PUT, &resource_path(webmap_id))
            .json(&payload);
        self.transport().send(request).await?;

        tracing::info!("🗺️  Reordered web map {}", webmap_id);
        Ok(())
    }
}
