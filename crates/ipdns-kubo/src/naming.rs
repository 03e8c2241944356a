use async_trait::async_trait;
use ipdns_naming::{validate_key_name, NamingError, NamingService, Result};
use ipdns_types::{ContentId, PointerId};
use tracing::debug;

use crate::client::KuboClient;
use crate::error::KuboError;
use crate::parse::{
    is_already_exists, is_unknown_key, is_unresolvable, parse_key_list, parse_keygen_output,
    parse_resolve_output,
};

#[async_trait]
impl NamingService for KuboClient {
    async fn generate_key(&self, name: &str) -> Result<PointerId> {
        validate_key_name(name)?;
        let output = match self
            .run(["key", "gen", "--type=rsa", "--size=2048", name])
            .await
        {
            Ok(output) => output,
            Err(e @ KuboError::Command { .. }) if is_already_exists(e.stderr()) => {
                return Err(NamingError::AlreadyExists {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let key = parse_keygen_output(&output)?;
        debug!(name, key = %key.short(), "key generated");
        Ok(key)
    }

    async fn list_keys(&self) -> Result<Vec<(String, PointerId)>> {
        let output = self.run(["key", "list", "-l"]).await?;
        Ok(parse_key_list(&output)?)
    }

    async fn publish(&self, key: &PointerId, cid: &ContentId) -> Result<()> {
        let name = self
            .name_for_key(key)
            .await?
            .ok_or_else(|| NamingError::UnknownKey { key: key.clone() })?;
        self.publish_to_name(&name, cid).await
    }

    async fn resolve(&self, key: &PointerId) -> Result<Option<ContentId>> {
        match self.run(["name", "resolve", key.as_str()]).await {
            Ok(output) => Ok(Some(parse_resolve_output(&output)?)),
            Err(e @ KuboError::Command { .. }) if is_unresolvable(e.stderr()) => {
                debug!(key = %key.short(), "nothing published");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn publish_to_name(&self, name: &str, cid: &ContentId) -> Result<()> {
        let key_arg = format!("--key={name}");
        let ipfs_path = format!("/ipfs/{cid}");
        match self
            .run(["name", "publish", key_arg.as_str(), ipfs_path.as_str()])
            .await
        {
            Ok(_) => {
                debug!(name, cid = %cid.short(), "pointer published");
                Ok(())
            }
            Err(e @ KuboError::Command { .. }) if is_unknown_key(e.stderr()) => {
                Err(NamingError::UnknownName {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
