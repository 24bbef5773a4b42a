//! modelgate - Resilient client for a host-local inference endpoint.
//!
//! From inside a container or other isolated network namespace, this crate
//! finds the model-serving host (layered resolution chain ending in a
//! constant fallback), binds one HTTP channel to it exactly once, and runs
//! chat-completion queries with bounded, jittered retry over transient
//! failures. Responses are normalized to either free text or the decoded
//! argument object of a forced function invocation, together with latency
//! and token accounting.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelgate::{FunctionSpec, ModelOptions, QueryClient};
//!
//! #[tokio::main]
//! async fn main() -> modelgate::Result<()> {
//!     let client = QueryClient::new();
//!     let options = ModelOptions::new("qwen2.5-32b").with_max_tokens(512);
//!
//!     let result = client
//!         .query(Some("Answer briefly."), Some("What is a monad?"), None, false, &options)
//!         .await?;
//!     println!("{:?} in {:?}", result.output, result.latency);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod resolver;

mod client;

// Re-export commonly used types
pub use client::{CompletionInfo, QueryClient, QueryOutput, QueryResult};
pub use error::{GateError, Result};
pub use network::{retry_transient, RetryConfig};
pub use protocol::{assemble_messages, ChatMessage, FunctionSpec, ModelOptions, Role};
pub use resolver::{resolve_host, ResolverTier};
