use std::io::Write;

use async_trait::async_trait;
use ipdns_store::{ObjectStore, StoreError, StoreResult};
use ipdns_types::ContentId;
use serde_json::Value;
use tracing::debug;

use crate::client::KuboClient;
use crate::error::KuboError;
use crate::parse::{is_unresolvable, parse_add_output};

#[async_trait]
impl ObjectStore for KuboClient {
    async fn put(&self, object: &Value) -> StoreResult<ContentId> {
        let data =
            serde_json::to_vec(object).map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Removed when `staged` drops, on every path out of this function.
        let mut staged = tempfile::Builder::new()
            .prefix("temp_")
            .tempfile_in(self.data_path())?;
        staged.write_all(&data)?;
        staged.flush()?;

        let output = self
            .run([std::ffi::OsStr::new("add"), staged.path().as_os_str()])
            .await?;
        let cid = parse_add_output(&output)?;
        debug!(cid = %cid.short(), bytes = data.len(), "object added");
        Ok(cid)
    }

    async fn get(&self, id: &ContentId) -> StoreResult<Option<Value>> {
        let staging = tempfile::Builder::new()
            .prefix("temp_")
            .tempdir_in(self.data_path())?;
        let target = staging.path().join(id.as_str());
        let ipfs_path = format!("/ipfs/{id}");

        let fetched = self
            .run([
                std::ffi::OsStr::new("get"),
                std::ffi::OsStr::new("--output"),
                target.as_os_str(),
                std::ffi::OsStr::new(&ipfs_path),
            ])
            .await;
        match fetched {
            Ok(_) => {}
            Err(e @ KuboError::Command { .. }) if is_unresolvable(e.stderr()) => {
                debug!(cid = %id.short(), "object not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let data = tokio::fs::read(&target).await?;
        let value = serde_json::from_slice(&data).map_err(|e| StoreError::CorruptObject {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(value))
    }
}
