//! Scan targets: a configured host, its resolved address and the ports it
//! is allowed to expose.

use crate::error::ResolutionError;
use crate::types::Port;
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use tracing::warn;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolver configured from the host system (resolv.conf, hosts file).
///
/// Falls back to the library defaults when the system configuration
/// cannot be read.
pub fn system_resolver() -> TokioAsyncResolver {
    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        warn!("unable to read system resolver configuration, using defaults: {}", e);
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    })
}

/// A host that has been resolved to an IP address.
///
/// Targets are built once before scanning starts and shared read-only by
/// every worker afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    ip: IpAddr,
    expected: HashSet<Port>,
}

impl Target {
    /// Create a target from an already known address.
    pub fn new(host: impl Into<String>, ip: IpAddr, expected: impl IntoIterator<Item = Port>) -> Self {
        Self {
            host: host.into(),
            ip,
            expected: expected.into_iter().collect(),
        }
    }

    /// Resolve `host` once, either as a literal IP address or through
    /// `resolver`.
    ///
    /// Empty host strings and strings containing whitespace are rejected
    /// without any lookup. For names resolving to several addresses the
    /// first one wins.
    pub async fn resolve(
        resolver: &TokioAsyncResolver,
        host: &str,
        expected: impl IntoIterator<Item = Port>,
    ) -> Result<Self, ResolutionError> {
        let trimmed = host.trim();

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Self::new(host, ip, expected));
        }

        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ResolutionError::InvalidHost(host.to_string()));
        }

        let response = resolver
            .lookup_ip(trimmed)
            .await
            .map_err(|e| ResolutionError::DnsFailed(host.to_string(), e.to_string()))?;

        let ip = response
            .iter()
            .next()
            .ok_or_else(|| ResolutionError::NoAddress(host.to_string()))?;

        Ok(Self::new(host, ip, expected))
    }

    /// The host identifier as written in the configuration.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Whether `port` is in this host's allowlist.
    pub fn is_expected(&self, port: Port) -> bool {
        self.expected.contains(&port)
    }

    pub fn expected_ports(&self) -> &HashSet<Port> {
        &self.expected
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.host, self.ip)
        }
    }
}
