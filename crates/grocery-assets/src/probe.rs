//! Connectivity probe based on reaching the app origin.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use grocery_store_rs::ConnectivityProbe;
use url::Url;

/// Default connect timeout.
const DEFAULT_TIMEOUT_MS: u64 = 1500;

/// Reports online when a TCP connection to the origin's host and port succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Probes the host and port of `origin`.
    ///
    /// Returns `None` if the URL has no host or no known default port.
    pub fn for_origin(origin: &Url) -> Option<Self> {
        Some(Self {
            host: origin.host_str()?.to_string(),
            port: origin.port_or_known_default()?,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn addresses(&self) -> Vec<SocketAddr> {
        match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "could not resolve probe host");
                Vec::new()
            }
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_online(&self) -> bool {
        let online = self
            .addresses()
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.timeout).is_ok());
        tracing::debug!(host = %self.host, port = self.port, online, "probed connectivity");
        online
    }
}
