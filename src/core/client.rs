use crate::config::ConnectionConfig;
use crate::core::transport::{id_from_response, Transport};
use crate::core::upload::uploader_for;
use crate::domain::model::{ErrorPolicy, ResourceClass, ResourceInfo, ResourceItem, UploadMeta};
use crate::domain::payload::{NewResource, ResourceBody};
use crate::domain::ports::FileUploader;
use crate::utils::error::{NgwError, Result};
use crate::utils::validation::Validate;
use reqwest::Method;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub(crate) const RESOURCE_COLLECTION: &str = "/api/resource/";

pub(crate) fn resource_path(id: u64) -> String {
    format!("/api/resource/{}", id)
}

/// Client for one NextGIS Web instance.
///
/// Holds only the connection settings; every method maps to one or a few
/// sequential REST calls.
#[derive(Clone)]
pub struct NgwClient {
    transport: Transport,
    uploader: Arc<dyn FileUploader>,
}

impl std::fmt::Debug for NgwClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NgwClient")
            .field("base_url", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}

impl NgwClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(&config)?;
        let uploader = uploader_for(&config.upload);
        Ok(Self {
            transport,
            uploader,
        })
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn FileUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Timestamp used wherever a display name is left out.
    pub fn generate_name() -> String {
        chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S%.6f")
            .to_string()
    }

    pub(crate) fn name_or_generated(display_name: Option<&str>) -> String {
        Self::name_or(display_name, Self::generate_name)
    }

    /// `display_name` unless it is missing or blank, else `fallback()`.
    pub(crate) fn name_or(display_name: Option<&str>, fallback: impl FnOnce() -> String) -> String {
        match display_name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => fallback(),
        }
    }

    pub async fn upload_file(&self, path: &Path) -> Result<UploadMeta> {
        self.uploader.upload(&self.transport, path).await
    }

    /// Validates and posts a creation payload, returning the new resource id.
    pub async fn create_resource(&self, resource: &NewResource) -> Result<u64> {
        resource.validate()?;
        tracing::debug!(
            "🆕 Creating {} '{}' in {}",
            resource.cls(),
            resource.display_name,
            resource.parent_id
        );

        let response: serde_json::Value = self
            .transport
            .post_json(RESOURCE_COLLECTION, resource)
            .await?;
        let id = id_from_response(&response)?;
        tracing::info!("✅ Created {} {} '{}'", resource.cls(), id, resource.display_name);
        Ok(id)
    }

    /// Raw JSON of `GET /api/resource/{id}`.
    pub async fn get_resource(&self, resource_id: u64) -> Result<serde_json::Value> {
        self.transport.get_json(&resource_path(resource_id)).await
    }

    pub async fn get_resource_info(&self, resource_id: u64) -> Result<ResourceInfo> {
        let item: ResourceItem = self.transport.get_json(&resource_path(resource_id)).await?;
        Ok(item.resource)
    }

    pub async fn get_child_resources(&self, parent_id: u64) -> Result<Vec<ResourceItem>> {
        let request = self
            .transport
            .request(Method::GET, RESOURCE_COLLECTION)
            .query(&[("parent", parent_id)]);
        let response = self.transport.send(request).await?;
        Ok(response.json().await?)
    }

    pub async fn search_group_by_name(&self, name: &str, parent_id: u64) -> Result<Option<u64>> {
        let children = self.get_child_resources(parent_id).await?;
        Ok(children
            .into_iter()
            .map(|item| item.resource)
            .find(|r| r.cls == ResourceClass::ResourceGroup && r.display_name == name)
            .map(|r| r.id))
    }

    /// Ids of the direct children of `parent_id` with class `cls`; empty if
    /// there are none.
    pub async fn search_by_cls(&self, parent_id: u64, cls: &ResourceClass) -> Result<Vec<u64>> {
        let children = self.get_child_resources(parent_id).await?;
        Ok(children
            .into_iter()
            .filter(|item| &item.resource.cls == cls)
            .map(|item| item.resource.id)
            .collect())
    }

    pub async fn update_resource_payload(
        &self,
        resource_id: u64,
        payload: &serde_json::Value,
        policy: ErrorPolicy,
    ) -> Result<()> {
        if payload.is_null() {
            return Err(NgwError::precondition("update payload must not be null"));
        }
        let request = self
            .transport
            .request(Method::PUT, &resource_path(resource_id))
            .json(payload);
        self.transport.send_with_policy(request, policy).await
    }

    pub async fn rename_resource(&self, resource_id: u64, display_name: &str, policy: ErrorPolicy) -> Result<()> {
        if display_name.trim().is_empty() {
            return Err(NgwError::precondition("display name must not be empty"));
        }
        let payload = json!({ "resource": { "display_name": display_name } });
        self.update_resource_payload(resource_id, &payload, policy).await
    }

    pub async fn move_resource(&self, resource_id: u64, parent_id: u64, policy: ErrorPolicy) -> Result<()> {
        let payload = json!({ "resource": { "parent": { "id": parent_id } } });
        self.update_resource_payload(resource_id, &payload, policy).await
    }

    pub async fn delete_resource(&self, resource_id: u64, policy: ErrorPolicy) -> Result<()> {
        tracing::debug!("🗑️  Deleting resource {}", resource_id);
        let request = self
            .transport
            .request(Method::DELETE, &resource_path(resource_id));
        self.transport.send_with_policy(request, policy).await
    }

    /// Deletes every direct child of the group; the group itself stays.
    pub async fn truncate_group(&self, group_id: u64, policy: ErrorPolicy) -> Result<()> {
        let children = self.get_child_resources(group_id).await?;
        tracing::info!("🧹 Truncating group {} ({} children)", group_id, children.len());
        for child in children {
            self.delete_resource(child.resource.id, policy).await?;
        }
        Ok(())
    }

    /// Creates a group, failing with `AlreadyExists` when `parent_id` already
    /// holds a group of that name.
    pub async fn create_resource_group(&self, parent_id: u64, display_name: Option<&str>) -> Result<u64> {
        let name = Self::name_or_generated(display_name);
        if self.search_group_by_name(&name, parent_id).await?.is_some() {
            return Err(NgwError::AlreadyExists {
                what: format!("resource group '{}' in {}", name, parent_id),
            });
        }
        self.create_resource(&NewResource::new(parent_id, name, ResourceBody::ResourceGroup))
            .await
    }

    /// Reuses an existing group of that name after deleting its children, or
    /// creates it.
    pub async fn create_or_truncate_resource_group(&self, parent_id: u64, display_name: &str) -> Result<u64> {
        if let Some(group_id) = self.search_group_by_name(display_name, parent_id).await? {
            self.truncate_group(group_id, ErrorPolicy::Strict).await?;
            return Ok(group_id);
        }
        self.create_resource(&NewResource::new(
            parent_id,
            display_name,
            ResourceBody::ResourceGroup,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> NgwClient {
        NgwClient::new(ConnectionConfig::new(server.base_url(), "administrator", "demodemo")).unwrap()
    }

    fn children_json() -> serde_json::Value {
        json!([
            {"resource": {"id": 11, "cls": "resource_group", "parent": {"id": 0}, "display_name": "imports"}},
            {"resource": {"id": 12, "cls": "webmap", "parent": {"id": 0}, "display_name": "map"}},
            {"resource": {"id": 13, "cls": "webmap", "parent": {"id": 0}, "display_name": "map 2"}}
        ])
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = NgwClient::new(ConnectionConfig::new("https://sandbox.nextgis.com/", "administrator", "x"));
        assert!(matches!(result, Err(NgwError::InvalidConfigValueError { .. })));
    }

    #[test]
    fn test_name_or_generated() {
        assert_eq!(NgwClient::name_or_generated(Some("roads")), "roads");
        assert!(!NgwClient::name_or_generated(Some("")).is_empty());
        assert!(!NgwClient::name_or_generated(None).is_empty());
    }

    #[tokio::test]
    async fn test_search_by_cls_and_group_name() {
        let server = MockServer::start();
        let children_mock = server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "0");
            then.status(200).json_body(children_json());
        });
        let client = client(&server);

        let webmaps = client.search_by_cls(0, &ResourceClass::Webmap).await.unwrap();
        let styles = client.search_by_cls(0, &ResourceClass::QgisVectorStyle).await.unwrap();
        let group = client.search_group_by_name("imports", 0).await.unwrap();
        let missing = client.search_group_by_name("map", 0).await.unwrap();

        children_mock.assert_hits(4);
        assert_eq!(webmaps, vec![12, 13]);
        assert!(styles.is_empty());
        assert_eq!(group, Some(11));
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_create_resource_group_fails_when_name_taken() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "0");
            then.status(200).json_body(children_json());
        });
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/api/resource/");
            then.status(201).json_body(json!({"id": 99}));
        });

        let err = client(&server)
            .create_resource_group(0, Some("imports"))
            .await
            .unwrap_err();

        assert!(matches!(err, NgwError::AlreadyExists { .. }));
        create_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_create_resource_group_posts_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "0");
            then.status(200).json_body(children_json());
        });
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/api/resource/").json_body(json!({
                "resource": {"cls": "resource_group", "parent": {"id": 0}, "display_name": "exports"}
            }));
            then.status(201).json_body(json!({"id": 99, "parent": {"id": 0}}));
        });

        let id = client(&server)
            .create_resource_group(0, Some("exports"))
            .await
            .unwrap();

        create_mock.assert();
        assert_eq!(id, 99);
    }

    #[tokio::test]
    async fn test_create_or_truncate_reuses_existing_group() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "0");
            then.status(200).json_body(children_json());
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "11");
            then.status(200).json_body(json!([
                {"resource": {"id": 21, "cls": "vector_layer", "parent": {"id": 11}, "display_name": "a"}},
                {"resource": {"id": 22, "cls": "raster_layer", "parent": {"id": 11}, "display_name": "b"}}
            ]));
        });
        let delete_21 = server.mock(|when, then| {
            when.method(DELETE).path("/api/resource/21");
            then.status(200).json_body(json!({}));
        });
        let delete_22 = server.mock(|when, then| {
            when.method(DELETE).path("/api/resource/22");
            then.status(200).json_body(json!({}));
        });

        let id = client(&server)
            .create_or_truncate_resource_group(0, "imports")
            .await
            .unwrap();

        assert_eq!(id, 11);
        delete_21.assert();
        delete_22.assert();
    }

    #[tokio::test]
    async fn test_update_resource_payload_policies() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/api/resource/5");
            then.status(422).json_body(json!({"message": "Validation error"}));
        });
        let client = client(&server);
        let payload = json!({"resource": {"display_name": "x"}});

        assert!(client
            .update_resource_payload(5, &payload, ErrorPolicy::BestEffort)
            .await
            .is_ok());
        assert!(matches!(
            client.update_resource_payload(5, &payload, ErrorPolicy::Strict).await,
            Err(NgwError::UnexpectedStatus { status: 422, .. })
        ));
        assert!(matches!(
            client
                .update_resource_payload(5, &serde_json::Value::Null, ErrorPolicy::BestEffort)
                .await,
            Err(NgwError::Precondition { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_resource_info() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/12");
            then.status(200).json_body(json!({
                "resource": {"id": 12, "cls": "webmap", "parent": {"id": 0}, "display_name": "map", "description": null},
                "webmap": {"root_item": {"item_type": "root", "children": []}}
            }));
        });

        let info = client(&server).get_resource_info(12).await.unwrap();

        assert_eq!(info.cls, ResourceClass::Webmap);
        assert_eq!(info.parent_id(), Some(0));
        assert_eq!(info.description, None);
    }
}
