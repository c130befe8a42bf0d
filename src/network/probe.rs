//! Multi-signal connectivity detection
//!
//! Two heuristics (a DNS lookup and a HEAD request) run concurrently and are
//! combined with OR. A positive result must also be backed by at least one
//! non-loopback network interface.

use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::config::ProbeConfig;

/// Windows `WSAHOST_NOT_FOUND`
const WSAHOST_NOT_FOUND: i32 = 11001;
/// Windows `WSANO_DATA`
const WSANO_DATA: i32 = 11004;

/// Resolver messages meaning the name does not exist
const HOST_NOT_FOUND_MESSAGES: &[&str] = &[
    "name or service not known",
    "no address associated with hostname",
    "nodename nor servname provided, or not known",
    "no such host is known",
    "name does not resolve",
];

/// Verdict of a single reachability heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// A single reachability heuristic. Never fails; errors mean `Unreachable`
/// or `Reachable` depending on the heuristic's own rules.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn check(&self) -> Reachability;
}

/// Source of local interface addresses
#[cfg_attr(test, automock)]
pub trait InterfaceSource: Send + Sync {
    fn addresses(&self) -> io::Result<Vec<IpAddr>>;
}

/// Anything that can decide whether the run is online
#[async_trait::async_trait]
pub trait ConnectivityCheck: Send + Sync {
    async fn is_connected(&self) -> bool;
}

/// Classify a failed host lookup.
///
/// Only a "host not found" class of error counts as unreachable; anything
/// else (a flaky resolver, a refused socket) is treated as reachable.
pub fn classify_lookup_error(error: &io::Error) -> Reachability {
    if error.kind() == io::ErrorKind::NotFound {
        return Reachability::Unreachable;
    }

    if matches!(error.raw_os_error(), Some(WSAHOST_NOT_FOUND | WSANO_DATA)) {
        return Reachability::Unreachable;
    }

    let message = error.to_string().to_ascii_lowercase();
    if HOST_NOT_FOUND_MESSAGES
        .iter()
        .any(|needle| message.contains(needle))
    {
        return Reachability::Unreachable;
    }

    Reachability::Reachable
}

/// True when at least one address is not a loopback address
pub fn has_external_interface(addresses: &[IpAddr]) -> bool {
    addresses.iter().any(|ip| !ip.is_loopback())
}

/// DNS heuristic: resolve a well-known hostname
pub struct DnsLookup {
    host: String,
    timeout: Duration,
}

impl DnsLookup {
    pub fn new(host: &str, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ReachabilityCheck for DnsLookup {
    async fn check(&self) -> Reachability {
        let target = format!("{}:443", self.host);

        match tokio::time::timeout(self.timeout, tokio::net::lookup_host(target)).await {
            Ok(Ok(_)) => Reachability::Reachable,
            Ok(Err(e)) => {
                let verdict = classify_lookup_error(&e);
                debug!("DNS lookup of {} failed ({:?}): {}", self.host, verdict, e);
                verdict
            }
            Err(_) => {
                debug!(
                    "DNS lookup of {} timed out after {:?}",
                    self.host, self.timeout
                );
                Reachability::Unreachable
            }
        }
    }
}

/// HTTP heuristic: a single HEAD request, 2xx means reachable
pub struct HeadRequest {
    client: reqwest::Client,
    url: String,
}

impl HeadRequest {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("game-version-sync")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ReachabilityCheck for HeadRequest {
    async fn check(&self) -> Reachability {
        match self.client.head(&self.url).send().await {
            Ok(response) if response.status().is_success() => Reachability::Reachable,
            Ok(response) => {
                debug!("HEAD {} returned status {}", self.url, response.status());
                Reachability::Unreachable
            }
            Err(e) => {
                debug!("HEAD {} failed: {}", self.url, e);
                Reachability::Unreachable
            }
        }
    }
}

/// Interface addresses of the local machine
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn addresses(&self) -> io::Result<Vec<IpAddr>> {
        Ok(if_addrs::get_if_addrs()?
            .into_iter()
            .map(|iface| iface.ip())
            .collect())
    }
}

/// Combines the DNS and HTTP heuristics with local link evidence
pub struct ConnectivityProbe {
    dns: Arc<dyn ReachabilityCheck>,
    http: Arc<dyn ReachabilityCheck>,
    interfaces: Arc<dyn InterfaceSource>,
}

impl ConnectivityProbe {
    pub fn new(
        dns: Arc<dyn ReachabilityCheck>,
        http: Arc<dyn ReachabilityCheck>,
        interfaces: Arc<dyn InterfaceSource>,
    ) -> Self {
        Self {
            dns,
            http,
            interfaces,
        }
    }

    /// Build the probe against the real network
    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let dns = DnsLookup::new(
            &config.dns_host,
            Duration::from_millis(config.dns_timeout_ms),
        );
        let http = HeadRequest::new(
            &config.http_url,
            Duration::from_millis(config.http_timeout_ms),
        )?;
        Ok(Self::new(
            Arc::new(dns),
            Arc::new(http),
            Arc::new(SystemInterfaces),
        ))
    }

    pub async fn probe(&self) -> bool {
        let (dns, http) = join(self.dns.check(), self.http.check()).await;
        debug!("Reachability heuristics: dns={:?} http={:?}", dns, http);

        if dns == Reachability::Unreachable && http == Reachability::Unreachable {
            return false;
        }

        let addresses = self.interfaces.addresses().unwrap_or_else(|e| {
            debug!("Failed to list network interfaces: {}", e);
            Vec::new()
        });

        let connected = has_external_interface(&addresses);
        if !connected {
            debug!("No non-loopback interface, treating network as unavailable");
        }
        connected
    }
}

#[async_trait::async_trait]
impl ConnectivityCheck for ConnectivityProbe {
    async fn is_connected(&self) -> bool {
        self.probe().await
    }
}
