use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ipdns_resolver::RetryPolicy;
use ipdns_types::PointerId;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{ServerError, ServerResult};

/// How a backend failure is reported to the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFailurePolicy {
    /// Answer NXDOMAIN, as for a name that does not exist.
    #[default]
    NxDomain,
    /// Answer SERVFAIL so clients can tell an outage from an absent name.
    ServFail,
}

/// Server settings, loadable from TOML. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Trust root every walk starts from.
    pub root_key: Option<PointerId>,
    /// Directory for Kubo transfer files.
    pub data_path: PathBuf,
    pub max_in_flight: usize,
    pub request_timeout_ms: u64,
    pub answer_ttl: u32,
    pub backend_failure_policy: BackendFailurePolicy,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub ipfs_bin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 53)), 53),
            root_key: None,
            data_path: PathBuf::from("."),
            max_in_flight: 64,
            request_timeout_ms: 5_000,
            answer_ttl: 0,
            backend_failure_policy: BackendFailurePolicy::NxDomain,
            retry_attempts: 2,
            retry_backoff_ms: 50,
            ipfs_bin: "ipfs".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.max_in_flight == 0 {
            return Err(ServerError::Config("max_in_flight must be at least 1".into()));
        }
        let ceiling = Semaphore::MAX_PERMITS.min(u32::MAX as usize);
        if self.max_in_flight > ceiling {
            return Err(ServerError::Config(format!(
                "max_in_flight must be at most {ceiling}"
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ServerError::Config("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.53:53".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_in_flight, 64);
        assert_eq!(c.request_timeout(), Duration::from_secs(5));
        assert_eq!(c.backend_failure_policy, BackendFailurePolicy::NxDomain);
        assert_eq!(c.retry_policy(), RetryPolicy::default());
        assert!(c.root_key.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
bind_addr = "0.0.0.0:5353"
root_key = "k51qzi5uqu5dlvj2baxnqndepeb86cbk3ng7n3i46uzyxzyqj2xjonzllnv0v8"
backend_failure_policy = "servfail"
answer_ttl = 300
"#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 5353);
        assert_eq!(c.backend_failure_policy, BackendFailurePolicy::ServFail);
        assert_eq!(c.answer_ttl, 300);
        assert!(c.root_key.is_some());
        assert_eq!(c.max_in_flight, 64);
        assert_eq!(c.ipfs_bin, "ipfs");
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = 12"),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("root_key = \"not a key\""),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("max_in_flight = 0"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn max_in_flight_upper_bound() {
        for too_many in ["9223372036854775807", "4294967296"] {
            let err = ServerConfig::from_toml_str(&format!("max_in_flight = {too_many}"));
            assert!(matches!(err, Err(ServerError::Config(_))), "{too_many} accepted");
        }
        let ceiling = Semaphore::MAX_PERMITS.min(u32::MAX as usize);
        let c = ServerConfig::from_toml_str(&format!("max_in_flight = {ceiling}")).unwrap();
        assert_eq!(c.max_in_flight, ceiling);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipdns.toml");
        std::fs::write(&path, "request_timeout_ms = 250\nretry_attempts = 3\n").unwrap();

        let c = ServerConfig::from_toml_file(&path).unwrap();
        assert_eq!(c.request_timeout(), Duration::from_millis(250));
        assert_eq!(c.retry_policy().attempts, 3);

        assert!(ServerConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
