//! Host resolution for the model-serving process.
//!
//! From inside an isolated network namespace the serving host is not
//! addressable by name, so the resolver walks a prioritized chain of tiers
//! and returns the first answer:
//!
//! 1. `MODELGATE_HOST_IP` env override
//! 2. Default-route gateway from the kernel routing table
//! 3. DNS lookup of the desktop runtime alias (`host.docker.internal`)
//! 4. Hard fallback to the standard bridge gateway (`172.17.0.1`)
//!
//! Resolution never fails: every tier degrades silently to the next and the
//! final tier is a constant. Each tier is a pure probe, so the chain's
//! policy is data, not control flow.

mod route_table;

pub use route_table::{default_gateway, parse_default_gateway};

use crate::config::ResolverConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// One tier of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverTier {
    /// Explicit override via the `MODELGATE_HOST_IP` environment variable.
    EnvOverride,
    /// Default-route gateway from `/proc/net/route`.
    RouteTable,
    /// DNS resolution of `host.docker.internal`.
    DesktopDns,
    /// Literal `172.17.0.1`, the standard Linux bridge gateway.
    BridgeFallback,
}

impl std::fmt::Display for ResolverTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverTier::EnvOverride => write!(f, "env override"),
            ResolverTier::RouteTable => write!(f, "routing table"),
            ResolverTier::DesktopDns => write!(f, "desktop alias DNS"),
            ResolverTier::BridgeFallback => write!(f, "bridge fallback"),
        }
    }
}

/// Default resolution order. The final tier always answers.
pub const DEFAULT_CHAIN: &[ResolverTier] = &[
    ResolverTier::EnvOverride,
    ResolverTier::RouteTable,
    ResolverTier::DesktopDns,
    ResolverTier::BridgeFallback,
];

impl ResolverTier {
    /// Probe this tier. `None` means the tier has no answer and the chain
    /// moves on.
    pub async fn probe(&self) -> Option<String> {
        match self {
            ResolverTier::EnvOverride => {
                let value = std::env::var(ResolverConfig::HOST_OVERRIDE_VAR).ok()?;
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            ResolverTier::RouteTable => {
                default_gateway(Path::new(ResolverConfig::ROUTE_TABLE_PATH))
                    .map(|ip| ip.to_string())
            }
            ResolverTier::DesktopDns => {
                // lookup_host wants a port; it is discarded.
                let query = format!("{}:0", ResolverConfig::DESKTOP_HOST_ALIAS);
                match tokio::net::lookup_host(query).await {
                    Ok(mut addrs) => addrs.next().map(|addr| addr.ip().to_string()),
                    Err(e) => {
                        debug!(
                            "DNS lookup of {} failed: {}",
                            ResolverConfig::DESKTOP_HOST_ALIAS,
                            e
                        );
                        None
                    }
                }
            }
            ResolverTier::BridgeFallback => {
                Some(ResolverConfig::BRIDGE_GATEWAY_FALLBACK.to_string())
            }
        }
    }
}

/// Resolve the address of the model-serving host.
///
/// Walks [`DEFAULT_CHAIN`] and returns the first tier's answer. Always
/// produces an address; the only side effect is diagnostic logging.
pub async fn resolve_host() -> String {
    for tier in DEFAULT_CHAIN {
        if let Some(host) = tier.probe().await {
            if *tier == ResolverTier::BridgeFallback {
                warn!("Falling back to hard-coded bridge gateway: {}", host);
            } else {
                info!("Host resolved via {}: {}", tier, host);
            }
            return host;
        }
        debug!("Resolver tier {} had no answer", tier);
    }
    unreachable!("bridge fallback tier always resolves")
}
