use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource class as reported in `resource.cls`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceClass {
    ResourceGroup,
    VectorLayer,
    RasterLayer,
    RasterStyle,
    QgisVectorStyle,
    PostgisConnection,
    PostgisLayer,
    WmsclientConnection,
    WmsclientLayer,
    WmsserverService,
    WfsserverService,
    Webmap,
    Other(String),
}

impl ResourceClass {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceClass::ResourceGroup => "resource_group",
            ResourceClass::VectorLayer => "vector_layer",
            ResourceClass::RasterLayer => "raster_layer",
            ResourceClass::RasterStyle => "raster_style",
            ResourceClass::QgisVectorStyle => "qgis_vector_style",
            ResourceClass::PostgisConnection => "postgis_connection",
            ResourceClass::PostgisLayer => "postgis_layer",
            ResourceClass::WmsclientConnection => "wmsclient_connection",
            ResourceClass::WmsclientLayer => "wmsclient_layer",
            ResourceClass::WmsserverService => "wmsserver_service",
            ResourceClass::WfsserverService => "wfsserver_service",
            ResourceClass::Webmap => "webmap",
            ResourceClass::Other(cls) => cls,
        }
    }
}

impl From<String> for ResourceClass {
    fn from(cls: String) -> Self {
        match cls.as_str() {
            "resource_group" => ResourceClass::ResourceGroup,
            "vector_layer" => ResourceClass::VectorLayer,
            "raster_layer" => ResourceClass::RasterLayer,
            "raster_style" => ResourceClass::RasterStyle,
            "qgis_vector_style" => ResourceClass::QgisVectorStyle,
            "postgis_connection" => ResourceClass::PostgisConnection,
            "postgis_layer" => ResourceClass::PostgisLayer,
            "wmsclient_connection" => ResourceClass::WmsclientConnection,
            "wmsclient_layer" => ResourceClass::WmsclientLayer,
            "wmsserver_service" => ResourceClass::WmsserverService,
            "wfsserver_service" => ResourceClass::WfsserverService,
            "webmap" => ResourceClass::Webmap,
            _ => ResourceClass::Other(cls),
        }
    }
}

impl From<&str> for ResourceClass {
    fn from(cls: &str) -> Self {
        ResourceClass::from(cls.to_string())
    }
}

impl From<ResourceClass> for String {
    fn from(cls: ResourceClass) -> Self {
        cls.as_str().to_string()
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: u64,
    pub cls: ResourceClass,
    #[serde(default)]
    pub parent: Option<ResourceRef>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ResourceInfo {
    pub fn parent_id(&self) -> Option<u64> {
        self.parent.map(|p| p.id)
    }
}

/// One element of `GET /api/resource/?parent=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub resource: ResourceInfo,
}

/// A node of `webmap.root_item.children`.
///
/// Fields the client does not model are kept in `extra` so a web map can be
/// read, reordered and written back without losing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebmapItem {
    pub item_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_style_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_adapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WebmapItem>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WebmapItem {
    pub fn layer(display_name: impl Into<String>, style_id: u64, adapter: &str) -> Self {
        Self {
            item_type: "layer".to_string(),
            display_name: display_name.into(),
            layer_style_id: Some(style_id),
            layer_enabled: Some(true),
            layer_adapter: Some(adapter.to_string()),
            children: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebmapRootItem {
    pub item_type: String,
    #[serde(default)]
    pub children: Vec<WebmapItem>,
}

impl WebmapRootItem {
    pub fn new(children: Vec<WebmapItem>) -> Self {
        Self {
            item_type: "root".to_string(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebmapData {
    pub root_item: WebmapRootItem,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /api/resource/{id}` of a web map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebmapDocument {
    pub resource: ResourceInfo,
    pub webmap: WebmapData,
}

/// File-upload response, passed back verbatim as a layer `source` or a
/// style `file_upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How a non-ok response of an update call is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Strict,
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    GeoJson,
    Gpkg,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "GeoJSON",
            ExportFormat::Gpkg => "GPKG",
            ExportFormat::Csv => "CSV",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geojson" => Ok(ExportFormat::GeoJson),
            "gpkg" => Ok(ExportFormat::Gpkg),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub srs: u32,
    pub zipped: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::GeoJson,
            srs: 4326,
            zipped: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(rename = "minLon")]
    pub min_lon: f64,
    #[serde(rename = "minLat")]
    pub min_lat: f64,
    #[serde(rename = "maxLon")]
    pub max_lon: f64,
    #[serde(rename = "maxLat")]
    pub max_lat: f64,
}

/// Which display name `get_layers_for_webmap` gives each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameSource {
    #[default]
    Layer,
    Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOutcome {
    pub old_id: u64,
    pub new_id: u64,
    pub display_name: String,
    pub moved_children: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_class_round_trips_as_string() {
        let item: ResourceItem = serde_json::from_value(serde_json::json!({
            "resource": {"id": 7, "cls": "tmsclient_layer", "parent": {"id": 0}, "display_name": "tiles"}
        }))
        .unwrap();
        assert_eq!(
            item.resource.cls,
            ResourceClass::Other("tmsclient_layer".to_string())
        );
        assert_eq!(item.resource.parent_id(), Some(0));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["resource"]["cls"], "tmsclient_layer");
    }

    #[test]
    fn test_root_resource_has_no_parent() {
        let info: ResourceInfo = serde_json::from_value(serde_json::json!({
            "id": 0, "cls": "resource_group", "parent": null, "display_name": "Main resource group"
        }))
        .unwrap();
        assert_eq!(info.cls, ResourceClass::ResourceGroup);
        assert_eq!(info.parent_id(), None);
    }

    #[test]
    fn test_webmap_item_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "item_type": "layer",
            "display_name": "roads",
            "layer_style_id": 12,
            "layer_enabled": true,
            "layer_adapter": "image",
            "layer_min_scale_denom": 5000,
            "draw_order_position": 3
        });
        let item: WebmapItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.layer_style_id, Some(12));
        assert_eq!(item.extra.len(), 2);
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("geojson".parse::<ExportFormat>().unwrap(), ExportFormat::GeoJson);
        assert_eq!("GPKG".parse::<ExportFormat>().unwrap(), ExportFormat::Gpkg);
        assert!("shp".parse::<ExportFormat>().is_err());
    }
}
