use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use ipdns_resolver::Resolver;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{DnsRequestHandler, Outcome};

/// Receive buffer size. Longer datagrams are truncated and fail to decode.
pub const MAX_DATAGRAM: usize = 4096;

/// UDP DNS server.
///
/// Every datagram is handled on its own task. At most `max_in_flight`
/// requests run at once; when all permits are taken the receive loop waits.
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    handler: Arc<DnsRequestHandler>,
    limit: Arc<Semaphore>,
    max_in_flight: u32,
}

impl DnsServer {
    /// Bind `config.bind_addr` and prepare to answer with `resolver`.
    pub async fn bind(config: &ServerConfig, resolver: Arc<Resolver>) -> ServerResult<Self> {
        config.validate()?;
        let max_in_flight = u32::try_from(config.max_in_flight)
            .map_err(|_| ServerError::Config("max_in_flight out of range".into()))?;
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        Ok(Self {
            socket: Arc::new(socket),
            handler: Arc::new(DnsRequestHandler::new(resolver, config)),
            limit: Arc::new(Semaphore::new(max_in_flight as usize)),
            max_in_flight,
        })
    }

    /// The address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then wait for in-flight requests.
    pub async fn serve_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(addr = %self.local_addr()?, root = %self.handler.resolver().root(), "DNS server listening");

        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = self.limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let (len, peer) = tokio::select! {
                _ = &mut shutdown => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "receive failed");
                        continue;
                    }
                },
            };

            let datagram = buf[..len].to_vec();
            let handler = Arc::clone(&self.handler);
            let socket = Arc::clone(&self.socket);
            tokio::spawn(async move {
                let _permit = permit;
                match handler.handle(&datagram).await {
                    Outcome::Reply(bytes) => {
                        if let Err(e) = socket.send_to(&bytes, peer).await {
                            warn!(%peer, error = %e, "send failed");
                        }
                    }
                    Outcome::Drop(reason) => debug!(%peer, %reason, "no reply sent"),
                }
            });
        }

        info!("shutting down, waiting for in-flight requests");
        // Every task holds one permit until it finishes. The semaphore is
        // never closed, so this only returns once all of them are back.
        let _ = self.limit.acquire_many(self.max_in_flight).await;
        info!("DNS server stopped");
        Ok(())
    }
}
