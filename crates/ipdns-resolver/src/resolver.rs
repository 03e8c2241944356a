//! The domain-name walk.

use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use ipdns_naming::NamingService;
use ipdns_store::ObjectStore;
use ipdns_types::{ContentId, DomainName, Label, PointerId};
use tracing::{debug, warn};

use crate::error::{ResolveError, Transient};
use crate::record::{Delegation, DomainRecord};

/// Bounded retry for backend calls that fail transiently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Zero behaves as one.
    pub attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Outcome of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Vec<Ipv4Addr>),
    NotFound(NotFoundReason),
}

/// Why a walk ended without addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Nothing is published under the pointer.
    Unpublished { pointer: PointerId },
    /// The pointer names content the store does not have.
    MissingContent { cid: ContentId },
    /// The record has no entry for the label.
    NoDelegation { label: Label },
    /// The label's entry is not a pointer identity.
    MalformedDelegation { label: Label },
    /// The leaf record carries no usable address.
    NoAddress,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpublished { pointer } => write!(f, "nothing published at {pointer}"),
            Self::MissingContent { cid } => write!(f, "content {cid} unavailable"),
            Self::NoDelegation { label } => write!(f, "no delegation for `{label}`"),
            Self::MalformedDelegation { label } => write!(f, "malformed delegation for `{label}`"),
            Self::NoAddress => f.write_str("no address in leaf record"),
        }
    }
}

/// Walks domain names from a fixed trust root.
///
/// Each label costs one pointer resolution and one object fetch, TLD first.
/// The resolver never writes to either backend and holds no per-request
/// state, so one instance can serve any number of concurrent walks.
pub struct Resolver {
    store: Arc<dyn ObjectStore>,
    naming: Arc<dyn NamingService>,
    root: PointerId,
    retry: RetryPolicy,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        naming: Arc<dyn NamingService>,
        root: PointerId,
    ) -> Self {
        Self {
            store,
            naming,
            root,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The trust root every walk starts from.
    pub fn root(&self) -> &PointerId {
        &self.root
    }

    /// Walk `name` and return its addresses or the reason there are none.
    ///
    /// `Err` means a backend could not be reached; it never stands for an
    /// absent name.
    pub async fn resolve(&self, name: &DomainName) -> Result<Resolution, ResolveError> {
        let mut current = self.root.clone();

        for label in name.walk_order() {
            debug!(label = %label, pointer = %current.short(), "looking up label");
            let record = match self.load(&current).await? {
                Ok(record) => record,
                Err(reason) => return Ok(Resolution::NotFound(reason)),
            };
            current = match record.delegation(label) {
                Delegation::Pointer(next) => next,
                Delegation::Absent => {
                    return Ok(Resolution::NotFound(NotFoundReason::NoDelegation {
                        label: label.clone(),
                    }))
                }
                Delegation::Malformed => {
                    return Ok(Resolution::NotFound(NotFoundReason::MalformedDelegation {
                        label: label.clone(),
                    }))
                }
            };
        }

        debug!(pointer = %current.short(), "loading leaf record");
        let leaf = match self.load(&current).await? {
            Ok(record) => record,
            Err(reason) => return Ok(Resolution::NotFound(reason)),
        };
        Ok(match leaf.addresses() {
            Some(addrs) => Resolution::Found(addrs),
            None => Resolution::NotFound(NotFoundReason::NoAddress),
        })
    }

    /// Dereference a pointer and load the record it names.
    async fn load(
        &self,
        pointer: &PointerId,
    ) -> Result<Result<DomainRecord, NotFoundReason>, ResolveError> {
        let Some(cid) = self
            .call_with_retry("pointer resolve", || self.naming.resolve(pointer))
            .await?
        else {
            return Ok(Err(NotFoundReason::Unpublished {
                pointer: pointer.clone(),
            }));
        };
        let Some(value) = self
            .call_with_retry("object fetch", || self.store.get(&cid))
            .await?
        else {
            return Ok(Err(NotFoundReason::MissingContent { cid }));
        };
        Ok(Ok(DomainRecord::from_value(value)))
    }

    async fn call_with_retry<T, E, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, ResolveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient,
    {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(operation, attempt, error = %e, "backend call failed, retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ResolveError::Backend {
                        operation,
                        attempts: attempt,
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("root", &self.root)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ipdns_naming::{InMemoryNamingService, NamingError};
    use ipdns_store::{InMemoryObjectStore, StoreError, StoreResult};
    use serde_json::{json, Value};

    /// Counts every backend call and can fail the first few of them.
    #[derive(Default)]
    struct Instrumented {
        store: InMemoryObjectStore,
        naming: InMemoryNamingService,
        resolves: AtomicUsize,
        fetches: AtomicUsize,
        failures_left: AtomicUsize,
    }

    impl Instrumented {
        fn failing(times: usize) -> Self {
            let fake = Self::default();
            fake.failures_left.store(times, Ordering::SeqCst);
            fake
        }

        fn fail_now(&self) -> bool {
            self.failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }

        async fn bind(&self, name: &str, record: Value) -> PointerId {
            let key = self.naming.generate_key(name).await.unwrap();
            let cid = self.store.put(&record).await.unwrap();
            self.naming.publish(&key, &cid).await.unwrap();
            key
        }
    }

    #[async_trait]
    impl ObjectStore for Instrumented {
        async fn put(&self, object: &Value) -> StoreResult<ContentId> {
            self.store.put(object).await
        }

        async fn get(&self, id: &ContentId) -> StoreResult<Option<Value>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_now() {
                return Err(StoreError::Backend("connection refused".into()));
            }
            self.store.get(id).await
        }
    }

    #[async_trait]
    impl NamingService for Instrumented {
        async fn generate_key(&self, name: &str) -> ipdns_naming::Result<PointerId> {
            self.naming.generate_key(name).await
        }

        async fn list_keys(&self) -> ipdns_naming::Result<Vec<(String, PointerId)>> {
            self.naming.list_keys().await
        }

        async fn publish(&self, key: &PointerId, cid: &ContentId) -> ipdns_naming::Result<()> {
            self.naming.publish(key, cid).await
        }

        async fn resolve(&self, key: &PointerId) -> ipdns_naming::Result<Option<ContentId>> {
            self.resolves.fetch_add(1, Ordering::SeqCst);
            self.naming.resolve(key).await
        }
    }

    fn resolver(fake: &Arc<Instrumented>, root: PointerId) -> Resolver {
        Resolver::new(fake.clone(), fake.clone(), root).with_retry(RetryPolicy {
            attempts: 2,
            backoff: Duration::from_millis(1),
        })
    }

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    /// root -> test -> example -> www -> {"A": "93.184.216.34"}
    async fn example_chain(fake: &Instrumented) -> PointerId {
        let www = fake.bind("www", json!({"A": "93.184.216.34"})).await;
        let example = fake.bind("example", json!({"www": www.as_str()})).await;
        let test = fake.bind("test", json!({"example": example.as_str()})).await;
        fake.bind("root", json!({"test": test.as_str()})).await
    }

    #[tokio::test]
    async fn full_chain_resolves_to_leaf_address() {
        let fake = Arc::new(Instrumented::default());
        let root = example_chain(&fake).await;

        let resolution = resolver(&fake, root).resolve(&name("www.example.test")).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Found(vec![Ipv4Addr::new(93, 184, 216, 34)])
        );
        assert_eq!(fake.resolves.load(Ordering::SeqCst), 4);
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn zero_labels_dereference_root_once() {
        let fake = Arc::new(Instrumented::default());
        let root = fake.bind("root", json!({"A": ["10.0.0.1", "10.0.0.2"]})).await;

        let resolution = resolver(&fake, root).resolve(&DomainName::root()).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Found(vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)])
        );
        assert_eq!(fake.resolves.load(Ordering::SeqCst), 1);
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_label_short_circuits() {
        let fake = Arc::new(Instrumented::default());
        let test = fake.bind("test", json!({"other": "k51other"})).await;
        let root = fake.bind("root", json!({"test": test.as_str()})).await;

        let resolution = resolver(&fake, root).resolve(&name("www.example.test")).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound(NotFoundReason::NoDelegation { ref label }) if label.as_str() == "example"
        ));
        // root and test only; nothing below the missing label is touched.
        assert_eq!(fake.resolves.load(Ordering::SeqCst), 2);
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_delegation_is_not_found() {
        let fake = Arc::new(Instrumented::default());
        let root = fake.bind("root", json!({"test": {"nested": true}})).await;

        let resolution = resolver(&fake, root).resolve(&name("test")).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound(NotFoundReason::MalformedDelegation { .. })
        ));
    }

    #[tokio::test]
    async fn leaf_without_address_is_not_found() {
        let fake = Arc::new(Instrumented::default());
        let leaf = fake.bind("leaf", json!({"TXT": "hello"})).await;
        let root = fake.bind("root", json!({"test": leaf.as_str()})).await;

        let resolution = resolver(&fake, root).resolve(&name("test")).await.unwrap();
        assert_eq!(resolution, Resolution::NotFound(NotFoundReason::NoAddress));
    }

    #[tokio::test]
    async fn unpublished_pointer_is_not_found() {
        let fake = Arc::new(Instrumented::default());
        let dangling = fake.naming.generate_key("dangling").await.unwrap();
        let root = fake.bind("root", json!({"test": dangling.as_str()})).await;

        let resolution = resolver(&fake, root).resolve(&name("test")).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound(NotFoundReason::Unpublished { ref pointer }) if *pointer == dangling
        ));
    }

    #[tokio::test]
    async fn missing_content_is_not_found() {
        let fake = Arc::new(Instrumented::default());
        let root = fake.bind("root", json!({"A": "10.0.0.1"})).await;
        for id in fake.store.all_ids() {
            fake.store.remove(&id);
        }

        let resolution = resolver(&fake, root).resolve(&DomainName::root()).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound(NotFoundReason::MissingContent { .. })
        ));
    }

    #[tokio::test]
    async fn labels_are_case_sensitive() {
        let fake = Arc::new(Instrumented::default());
        let root = example_chain(&fake).await;

        let resolution = resolver(&fake, root).resolve(&name("WWW.example.test")).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound(NotFoundReason::NoDelegation { .. })
        ));
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let fake = Arc::new(Instrumented::failing(1));
        let root = example_chain(&fake).await;

        let resolution = resolver(&fake, root).resolve(&name("www.example.test")).await.unwrap();
        assert!(matches!(resolution, Resolution::Found(_)));
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn persistent_failure_is_backend_error() {
        let fake = Arc::new(Instrumented::failing(usize::MAX));
        let root = fake.bind("root", json!({"A": "10.0.0.1"})).await;

        let err = resolver(&fake, root).resolve(&DomainName::root()).await.unwrap_err();
        let ResolveError::Backend { operation, attempts, .. } = err;
        assert_eq!(operation, "object fetch");
        assert_eq!(attempts, 2);
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        struct Refusing;

        #[async_trait]
        impl NamingService for Refusing {
            async fn generate_key(&self, _: &str) -> ipdns_naming::Result<PointerId> {
                unreachable!()
            }
            async fn list_keys(&self) -> ipdns_naming::Result<Vec<(String, PointerId)>> {
                Ok(Vec::new())
            }
            async fn publish(&self, _: &PointerId, _: &ContentId) -> ipdns_naming::Result<()> {
                unreachable!()
            }
            async fn resolve(&self, _: &PointerId) -> ipdns_naming::Result<Option<ContentId>> {
                Err(NamingError::Protocol("garbled reply".into()))
            }
        }

        let resolver = Resolver::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(Refusing),
            PointerId::new("k51root").unwrap(),
        );
        let err = resolver.resolve(&DomainName::root()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Backend { attempts: 1, .. }));
    }
}
