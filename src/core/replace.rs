//! Swapping the data behind a vector layer while keeping its styles and name.
//!
//! The service offers no transaction across these calls, so nothing is rolled
//! back. Once the new layer exists, a failed step is reported as
//! `NgwError::ReplaceInterrupted` with both layer ids; depending on the step
//! the group then holds both layers, styles split between them, or only the
//! new layer under its temporary name.

use crate::core::client::NgwClient;
use crate::domain::model::{ErrorPolicy, ReplaceOutcome, ResourceClass};
use crate::utils::error::{NgwError, ReplaceStep, Result};
use std::path::Path;

fn interrupted(step: ReplaceStep, old_id: u64, new_id: u64) -> impl FnOnce(NgwError) -> NgwError {
    move |source| NgwError::ReplaceInterrupted {
        step,
        old_id,
        new_id,
        source: Box::new(source),
    }
}

impl NgwClient {
    pub async fn replace_vector_layer(&self, group_id: u64, display_name: &str, path: &Path) -> Result<ReplaceOutcome> {
        let old_layer = self
            .get_child_resources(group_id)
            .await?
            .into_iter()
            .map(|item| item.resource)
            .find(|r| r.cls == ResourceClass::VectorLayer && r.display_name == display_name)
            .ok_or_else(|| NgwError::NotFound {
                what: format!("vector layer '{}' in group {}", display_name, group_id),
            })?;
        let old_id = old_layer.id;

        let temp_name = format!("{} {}", display_name, Self::generate_name());
        let new_id = self
            .upload_vector_layer(path, group_id, Some(&temp_name))
            .await?;
        tracing::info!("🔁 Replacing layer {} with {} ('{}')", old_id, new_id, temp_name);

        let children = self
            .get_child_resources(old_id)
            .await
            .map_err(interrupted(ReplaceStep::MoveChildren, old_id, new_id))?;
        let mut moved_children = Vec::with_capacity(children.len());
        for child in children {
            let child_id = child.resource.id;
            self.move_resource(child_id, new_id, ErrorPolicy::Strict)
                .await
                .map_err(interrupted(ReplaceStep::MoveChildren, old_id, new_id))?;
            tracing::debug!("🔁 Moved {} {} to layer {}", child.resource.cls, child_id, new_id);
            moved_children.push(child_id);
        }

        self.delete_resource(old_id, ErrorPolicy::Strict)
            .await
            .map_err(interrupted(ReplaceStep::DeleteOld, old_id, new_id))?;

        self.rename_resource(new_id, display_name, ErrorPolicy::Strict)
            .await
            .map_err(interrupted(ReplaceStep::Rename, old_id, new_id))?;

        tracing::info!(
            "✅ Layer '{}' replaced: {} -> {}, {} children moved",
            display_name,
            old_id,
            new_id,
            moved_children.len()
        );
        Ok(ReplaceOutcome {
            old_id,
            new_id,
            display_name: display_name.to_string(),
            moved_children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, UploadMode, UploadSettings};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn client(server: &MockServer) -> NgwClient {
        let config = ConnectionConfig::new(server.base_url(), "administrator", "demodemo").with_upload(
            UploadSettings {
                mode: UploadMode::Direct,
                ..UploadSettings::default()
            },
        );
        NgwClient::new(config).unwrap()
    }

    fn geojson() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
        file
    }

    #[tokio::test]
    async fn test_missing_layer_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "5");
            then.status(200).json_body(json!([
                {"resource": {"id": 10, "cls": "resource_group", "parent": {"id": 5}, "display_name": "roads"}}
            ]));
        });
        let upload_mock = server.mock(|when, then| {
            when.method(PUT).path("/api/component/file_upload/upload");
            then.status(200).json_body(json!({"id": "x"}));
        });
        let file = geojson();

        let err = client(&server)
            .replace_vector_layer(5, "roads", file.path())
            .await
            .unwrap_err();

        assert!(matches!(err, NgwError::NotFound { .. }));
        upload_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_failed_delete_reports_intermediate_state() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "5");
            then.status(200).json_body(json!([
                {"resource": {"id": 10, "cls": "vector_layer", "parent": {"id": 5}, "display_name": "roads"}}
            ]));
        });
        server.mock(|when, then| {
            when.method(PUT).path("/api/component/file_upload/upload");
            then.status(200).json_body(json!({"id": "x"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/resource/");
            then.status(201).json_body(json!({"id": 20}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/").query_param("parent", "10");
            then.status(200).json_body(json!([]));
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/api/resource/10");
            then.status(403).json_body(json!({"message": "Forbidden"}));
        });
        let rename_mock = server.mock(|when, then| {
            when.method(PUT).path("/api/resource/20");
            then.status(200).json_body(json!({}));
        });
        let file = geojson();

        let err = client(&server)
            .replace_vector_layer(5, "roads", file.path())
            .await
            .unwrap_err();

        match err {
            NgwError::ReplaceInterrupted { step, old_id, new_id, source } => {
                assert_eq!(step, ReplaceStep::DeleteOld);
                assert_eq!((old_id, new_id), (10, 20));
                assert!(matches!(*source, NgwError::UnexpectedStatus { status: 403, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        rename_mock.assert_hits(0);
    }
}
