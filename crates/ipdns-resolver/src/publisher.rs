//! Out-of-band publishing of records and zone trees.
//!
//! Zone files are TOML. Each table is a label; the `A` key of a table holds
//! its addresses. Tables nest from the top-level domain down:
//!
//! ```toml
//! [test.example.www]
//! A = ["93.184.216.34"]
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::Arc;

use ipdns_naming::NamingService;
use ipdns_store::ObjectStore;
use ipdns_types::{DomainName, Label, PointerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PublishError;
use crate::record::DomainRecord;

/// Key name used for the zone root when none is given.
pub const DEFAULT_ROOT_NAME: &str = "ipdns-root";

/// One node of a zone tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneNode {
    /// Addresses served for this node.
    #[serde(rename = "A", default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Ipv4Addr>,

    /// Child nodes keyed by label.
    #[serde(flatten)]
    pub children: BTreeMap<String, ZoneNode>,
}

impl ZoneNode {
    /// Parse a zone tree from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, PublishError> {
        toml::from_str(text).map_err(|e| PublishError::ZoneFile(e.to_string()))
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(ZoneNode::node_count).sum::<usize>()
    }
}

type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<PointerId, PublishError>> + Send + 'a>>;

/// Stores records and binds them to pointers.
///
/// This is the only component that mutates pointer bindings.
pub struct ZonePublisher {
    store: Arc<dyn ObjectStore>,
    naming: Arc<dyn NamingService>,
}

impl ZonePublisher {
    pub fn new(store: Arc<dyn ObjectStore>, naming: Arc<dyn NamingService>) -> Self {
        Self { store, naming }
    }

    /// Store `record` and publish it under the key named `key_name`,
    /// creating the key if needed. Returns the key's pointer identity.
    pub async fn publish_record(
        &self,
        key_name: &str,
        record: &DomainRecord,
    ) -> Result<PointerId, PublishError> {
        let key = self.naming.ensure_key(key_name).await?;
        let cid = self.store.put(&record.to_value()).await?;
        self.naming.publish(&key, &cid).await?;
        debug!(key_name, key = %key.short(), cid = %cid.short(), "record published");
        Ok(key)
    }

    /// Publish a whole zone tree, children before parents, and return the
    /// pointer identity of the root.
    ///
    /// The root record is published under `root_name`; every other node
    /// under `<root_name>.<fully qualified name>`.
    pub async fn publish_zone(
        &self,
        root_name: &str,
        zone: &ZoneNode,
    ) -> Result<PointerId, PublishError> {
        let root = self
            .publish_node(root_name, root_name.to_string(), Vec::new(), zone)
            .await?;
        info!(root = %root, nodes = zone.node_count(), "zone published");
        Ok(root)
    }

    fn publish_node<'a>(
        &'a self,
        root_name: &'a str,
        key_name: String,
        labels: Vec<Label>,
        node: &'a ZoneNode,
    ) -> PublishFuture<'a> {
        Box::pin(async move {
            let mut record = DomainRecord::new();
            for (text, child) in &node.children {
                let label = Label::new(text.as_str())?;
                let mut child_labels = Vec::with_capacity(labels.len() + 1);
                child_labels.push(label.clone());
                child_labels.extend(labels.iter().cloned());
                let child_name = DomainName::from_labels(child_labels.clone())?;

                let child_key = self
                    .publish_node(
                        root_name,
                        format!("{root_name}.{child_name}"),
                        child_labels,
                        child,
                    )
                    .await?;
                record = record.with_delegation(&label, &child_key);
            }
            record = record.with_addresses(&node.addresses);
            self.publish_record(&key_name, &record).await
        })
    }
}

impl std::fmt::Debug for ZonePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZonePublisher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{NotFoundReason, Resolution, Resolver};
    use ipdns_naming::InMemoryNamingService;
    use ipdns_store::InMemoryObjectStore;
    use serde_json::json;

    const ZONE: &str = r#"
[test.example.www]
A = ["93.184.216.34"]

[test.example.mail]
A = ["192.0.2.25", "192.0.2.26"]

[test.example]
A = ["192.0.2.1"]
"#;

    fn backends() -> (Arc<InMemoryObjectStore>, Arc<InMemoryNamingService>) {
        (
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryNamingService::new()),
        )
    }

    #[test]
    fn zone_file_parses_nested_tables() {
        let zone = ZoneNode::from_toml_str(ZONE).unwrap();
        assert!(zone.addresses.is_empty());
        let example = &zone.children["test"].children["example"];
        assert_eq!(example.addresses, vec![Ipv4Addr::new(192, 0, 2, 1)]);
        assert_eq!(example.children.len(), 2);
        assert_eq!(zone.node_count(), 5);
    }

    #[test]
    fn zone_file_rejects_bad_addresses() {
        let err = ZoneNode::from_toml_str("[test]\nA = [\"not-an-ip\"]\n").unwrap_err();
        assert!(matches!(err, PublishError::ZoneFile(_)));
    }

    #[tokio::test]
    async fn publish_record_binds_key() {
        let (store, naming) = backends();
        let publisher = ZonePublisher::new(store.clone(), naming.clone());
        let record = DomainRecord::new().with_addresses(&[Ipv4Addr::new(10, 0, 0, 1)]);

        let key = publisher.publish_record("leaf", &record).await.unwrap();
        let cid = naming.resolve(&key).await.unwrap().unwrap();
        assert_eq!(store.get(&cid).await.unwrap(), Some(json!({"A": "10.0.0.1"})));

        // Republishing the same record keeps the same key and binding.
        let again = publisher.publish_record("leaf", &record).await.unwrap();
        assert_eq!(again, key);
        assert_eq!(naming.resolve(&key).await.unwrap(), Some(cid));
    }

    #[tokio::test]
    async fn published_zone_resolves() {
        let (store, naming) = backends();
        let publisher = ZonePublisher::new(store.clone(), naming.clone());
        let zone = ZoneNode::from_toml_str(ZONE).unwrap();

        let root = publisher.publish_zone("zone-root", &zone).await.unwrap();
        assert_eq!(naming.key_for_name("zone-root").await.unwrap(), Some(root.clone()));
        assert!(naming
            .key_for_name("zone-root.www.example.test")
            .await
            .unwrap()
            .is_some());

        let resolver = Resolver::new(store, naming, root);
        let www = resolver
            .resolve(&DomainName::parse("www.example.test").unwrap())
            .await
            .unwrap();
        assert_eq!(www, Resolution::Found(vec![Ipv4Addr::new(93, 184, 216, 34)]));

        let mail = resolver
            .resolve(&DomainName::parse("mail.example.test.").unwrap())
            .await
            .unwrap();
        assert_eq!(
            mail,
            Resolution::Found(vec![Ipv4Addr::new(192, 0, 2, 25), Ipv4Addr::new(192, 0, 2, 26)])
        );

        let test = resolver
            .resolve(&DomainName::parse("test").unwrap())
            .await
            .unwrap();
        assert_eq!(test, Resolution::NotFound(NotFoundReason::NoAddress));
    }

    #[tokio::test]
    async fn dotted_zone_key_fails() {
        let (store, naming) = backends();
        let publisher = ZonePublisher::new(store, naming.clone());
        let zone = ZoneNode::from_toml_str("[test.\"www.example\"]\nA = [\"10.0.0.1\"]\n").unwrap();

        let err = publisher.publish_zone("root", &zone).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::InvalidName(ipdns_types::TypeError::DotInLabel(_))
        ));
        assert!(naming.key_for_name("root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_label_in_zone_fails() {
        let (store, naming) = backends();
        let publisher = ZonePublisher::new(store, naming);
        let zone = ZoneNode::from_toml_str("[\"bücher\"]\nA = [\"10.0.0.1\"]\n").unwrap();

        let err = publisher.publish_zone("root", &zone).await.unwrap_err();
        assert!(matches!(err, PublishError::InvalidName(_)));
    }
}
