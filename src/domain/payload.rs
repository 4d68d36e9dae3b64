//! Typed creation payloads for `POST /api/resource/`.
//!
//! A payload is `{"resource": {...}, "<cls>": {...}}`. The class key and
//! `resource.cls` both come from the [`ResourceBody`] variant, so the two
//! can never disagree.

use crate::domain::model::{ResourceClass, ResourceRef, UploadMeta, WebmapItem, WebmapRootItem};
use crate::utils::error::{NgwError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Web Mercator, the SRS every layer created by this client is stored in.
pub const DEFAULT_SRS: u64 = 3857;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SrsRef {
    pub id: u64,
}

impl Default for SrsRef {
    fn default() -> Self {
        Self { id: DEFAULT_SRS }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorLayerBody {
    pub source: UploadMeta,
    pub srs: SrsRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct RasterLayerBody {
    pub source: UploadMeta,
    pub srs: SrsRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct QgisVectorStyleBody {
    pub file_upload: UploadMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostgisConnectionBody {
    pub hostname: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for PostgisConnectionBody {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 5432,
            database: "gis".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostgisLayerBody {
    pub connection: ResourceRef,
    pub table: String,
    pub schema: String,
    pub column_id: String,
    pub column_geom: String,
    pub geometry_type: String,
    pub fields: String,
    pub srs: SrsRef,
}

impl PostgisLayerBody {
    /// Defaults match tables loaded by `ogr2ogr`.
    pub fn new(connection_id: u64, table: impl Into<String>) -> Self {
        Self {
            connection: ResourceRef { id: connection_id },
            table: table.into(),
            schema: "public".to_string(),
            column_id: "ogc_fid".to_string(),
            column_geom: "wkb_geometry".to_string(),
            geometry_type: "LINESTRING".to_string(),
            fields: "update".to_string(),
            srs: SrsRef::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsConnectionBody {
    pub url: String,
    pub version: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsLayerBody {
    pub connection: ResourceRef,
    pub wmslayers: String,
    pub imgformat: String,
    pub srs: SrsRef,
}

/// Layer entry of a WMS server service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsServiceLayer {
    pub keyname: String,
    pub display_name: String,
    pub resource_id: u64,
    pub min_scale_denom: Option<u64>,
    pub max_scale_denom: Option<u64>,
}

/// Layer entry of a WFS server service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WfsServiceLayer {
    pub keyname: String,
    pub display_name: String,
    pub resource_id: u64,
    pub maxfeatures: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsServiceBody {
    pub layers: Vec<WmsServiceLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WfsServiceBody {
    pub layers: Vec<WfsServiceLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebmapBody {
    pub root_item: WebmapRootItem,
}

impl WebmapBody {
    pub fn new(children: Vec<WebmapItem>) -> Self {
        Self {
            root_item: WebmapRootItem::new(children),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResourceBody {
    ResourceGroup,
    VectorLayer(VectorLayerBody),
    RasterLayer(RasterLayerBody),
    RasterStyle,
    QgisVectorStyle(QgisVectorStyleBody),
    PostgisConnection(PostgisConnectionBody),
    PostgisLayer(PostgisLayerBody),
    WmsConnection(WmsConnectionBody),
    WmsLayer(WmsLayerBody),
    WmsService(WmsServiceBody),
    WfsService(WfsServiceBody),
    Webmap(WebmapBody),
}

impl ResourceBody {
    pub fn cls(&self) -> ResourceClass {
        match self {
            ResourceBody::ResourceGroup => ResourceClass::ResourceGroup,
            ResourceBody::VectorLayer(_) => ResourceClass::VectorLayer,
            ResourceBody::RasterLayer(_) => ResourceClass::RasterLayer,
            ResourceBody::RasterStyle => ResourceClass::RasterStyle,
            ResourceBody::QgisVectorStyle(_) => ResourceClass::QgisVectorStyle,
            ResourceBody::PostgisConnection(_) => ResourceClass::PostgisConnection,
            ResourceBody::PostgisLayer(_) => ResourceClass::PostgisLayer,
            ResourceBody::WmsConnection(_) => ResourceClass::WmsclientConnection,
            ResourceBody::WmsLayer(_) => ResourceClass::WmsclientLayer,
            ResourceBody::WmsService(_) => ResourceClass::WmsserverService,
            ResourceBody::WfsService(_) => ResourceClass::WfsserverService,
            ResourceBody::Webmap(_) => ResourceClass::Webmap,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ResourceBody::PostgisConnection(body) => {
                require_non_empty("postgis_connection.hostname", &body.hostname)?;
                require_non_empty("postgis_connection.database", &body.database)
            }
            ResourceBody::PostgisLayer(body) => require_non_empty("postgis_layer.table", &body.table),
            ResourceBody::WmsConnection(body) => require_non_empty("wmsclient_connection.url", &body.url),
            ResourceBody::WmsLayer(body) => {
                require_non_empty("wmsclient_layer.wmslayers", &body.wmslayers)
            }
            ResourceBody::VectorLayer(VectorLayerBody { source, .. })
            | ResourceBody::RasterLayer(RasterLayerBody { source, .. }) => {
                require_non_empty("source.id", &source.id)
            }
            ResourceBody::QgisVectorStyle(body) => {
                require_non_empty("qgis_vector_style.file_upload.id", &body.file_upload.id)
            }
            _ => Ok(()),
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NgwError::precondition(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[derive(Serialize)]
struct ResourceHeader<'a> {
    cls: ResourceClass,
    parent: ResourceRef,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub parent_id: u64,
    pub display_name: String,
    pub description: Option<String>,
    pub body: ResourceBody,
}

impl NewResource {
    pub fn new(parent_id: u64, display_name: impl Into<String>, body: ResourceBody) -> Self {
        Self {
            parent_id,
            display_name: display_name.into(),
            description: None,
            body,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cls(&self) -> ResourceClass {
        self.body.cls()
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("resource.display_name", &self.display_name)?;
        self.body.validate()
    }
}

impl Serialize for NewResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let cls = self.cls();
        let key = cls.as_str().to_string();
        let header = ResourceHeader {
            cls,
            parent: ResourceRef { id: self.parent_id },
            display_name: &self.display_name,
            description: self.description.as_deref(),
        };

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("resource", &header)?;
        match &self.body {
            ResourceBody::ResourceGroup | ResourceBody::RasterStyle => {}
            ResourceBody::VectorLayer(body) => map.serialize_entry(&key, body)?,
            ResourceBody::RasterLayer(body) => map.serialize_entry(&key, body)?,
            ResourceBody::QgisVectorStyle(body) => map.serialize_entry(&key, body)?,
            ResourceBody::PostgisConnection(body) => map.serialize_entry(&key, body)?,
            ResourceBody::PostgisLayer(body) => map.serialize_entry(&key, body)?,
            ResourceBody::WmsConnection(body) => map.serialize_entry(&key, body)?,
            ResourceBody::WmsLayer(body) => map.serialize_entry(&key, body)?,
            ResourceBody::WmsService(body) => {
                map.serialize_entry("resmeta", &serde_json::json!({ "items": {} }))?;
                map.serialize_entry(&key, body)?
            }
            ResourceBody::WfsService(body) => map.serialize_entry(&key, body)?,
            ResourceBody::Webmap(body) => map.serialize_entry(&key, body)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upload(id: &str) -> UploadMeta {
        serde_json::from_value(json!({"id": id, "size": 10, "mime_type": "application/json"})).unwrap()
    }

    #[test]
    fn test_group_payload_has_only_resource_key() {
        let payload = NewResource::new(0, "folder", ResourceBody::ResourceGroup);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"resource": {"cls": "resource_group", "parent": {"id": 0}, "display_name": "folder"}})
        );
    }

    #[test]
    fn test_vector_layer_payload_shape() {
        let payload = NewResource::new(
            5,
            "roads",
            ResourceBody::VectorLayer(VectorLayerBody {
                source: upload("abc"),
                srs: SrsRef::default(),
            }),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["resource"]["cls"], "vector_layer");
        assert_eq!(value["resource"]["parent"]["id"], 5);
        assert_eq!(value["vector_layer"]["source"]["id"], "abc");
        assert_eq!(value["vector_layer"]["srs"]["id"], 3857);
    }

    #[test]
    fn test_wms_service_payload_carries_resmeta() {
        let payload = NewResource::new(
            1,
            "svc",
            ResourceBody::WmsService(WmsServiceBody {
                layers: vec![WmsServiceLayer {
                    keyname: "12".to_string(),
                    display_name: "roads".to_string(),
                    resource_id: 12,
                    min_scale_denom: None,
                    max_scale_denom: None,
                }],
            }),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["resmeta"], json!({"items": {}}));
        assert_eq!(value["wmsserver_service"]["layers"][0]["resource_id"], 12);
        assert!(value["wmsserver_service"]["layers"][0]["min_scale_denom"].is_null());
    }

    #[test]
    fn test_description_is_optional() {
        let payload = NewResource::new(0, "conn", ResourceBody::PostgisConnection(Default::default()))
            .with_description("The localhost PostGIS Connection");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["resource"]["description"], "The localhost PostGIS Connection");
        assert_eq!(value["postgis_connection"]["port"], 5432);
    }

    #[test]
    fn test_validate_rejects_blank_names_and_fields() {
        assert!(NewResource::new(0, "  ", ResourceBody::ResourceGroup)
            .validate()
            .is_err());

        let blank_table = NewResource::new(0, "layer", ResourceBody::PostgisLayer(PostgisLayerBody::new(3, "")));
        assert!(matches!(
            blank_table.validate(),
            Err(NgwError::Precondition { .. })
        ));

        let ok = NewResource::new(0, "layer", ResourceBody::PostgisLayer(PostgisLayerBody::new(3, "roads")));
        assert!(ok.validate().is_ok());
    }
}
