//! Centralized configuration constants for modelgate.
//!
//! Groups the network parameters of the inference endpoint and the inputs
//! used by host resolution. Values are compile-time constants; runtime
//! overrides go through [`crate::RetryConfig`] and the resolver's env tier.

use std::time::Duration;

/// Network parameters for the inference endpoint.
pub struct NetworkConfig;

impl NetworkConfig {
    /// Port the model-serving host listens on.
    pub const INFERENCE_PORT: u16 = 8000;
    /// API base path appended to the resolved host.
    pub const API_BASE_PATH: &'static str = "/v1";
    /// Static credential for serving backends that require a bearer token
    /// but do not validate it.
    pub const PLACEHOLDER_API_KEY: &'static str = "testkey";
    /// TCP connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Total request timeout for completion calls. Local models can spend a
    /// long time in prefill on large prompts before the first byte arrives.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
    /// Timeout for the post-construction endpoint probe.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
    /// User agent sent with every request.
    pub const USER_AGENT: &'static str = "modelgate";
}

/// Inputs for host resolution.
pub struct ResolverConfig;

impl ResolverConfig {
    /// Environment variable that short-circuits resolution when set.
    pub const HOST_OVERRIDE_VAR: &'static str = "MODELGATE_HOST_IP";
    /// Kernel routing table (Linux).
    pub const ROUTE_TABLE_PATH: &'static str = "/proc/net/route";
    /// Hostname alias published by desktop container runtimes.
    pub const DESKTOP_HOST_ALIAS: &'static str = "host.docker.internal";
    /// Conventional gateway of the default Linux bridge network.
    pub const BRIDGE_GATEWAY_FALLBACK: &'static str = "172.17.0.1";
}
