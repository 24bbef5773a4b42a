//! Request executor for the inference endpoint.
//!
//! [`QueryClient`] owns one lazily-constructed channel (HTTP client + base
//! URL) and runs chat-completion queries over it: message assembly, forced
//! tool injection, bounded retry over transient failures, and decoding of
//! the first choice into text or structured output.

use crate::config::NetworkConfig;
use crate::error::{GateError, Result};
use crate::network::{retry_transient, RetryConfig};
use crate::protocol::{
    assemble_messages, ChatCompletion, ChatCompletionRequest, FunctionSpec, ModelOptions,
};
use crate::resolver::resolve_host;
use reqwest::{header, StatusCode};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Normalized output of one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Free-text answer; `None` when the model returned no content.
    Text(Option<String>),
    /// Decoded arguments of the forced function invocation.
    Structured(serde_json::Value),
}

impl QueryOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryOutput::Text(content) => content.as_deref(),
            QueryOutput::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            QueryOutput::Text(_) => None,
            QueryOutput::Structured(value) => Some(value),
        }
    }
}

/// Passthrough metadata from the completion envelope.
#[derive(Debug, Clone)]
pub struct CompletionInfo {
    pub system_fingerprint: Option<String>,
    pub model: String,
    pub created: i64,
}

/// Result of one query. Created fresh per call; owned by the caller.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub output: QueryOutput,
    /// Wall-clock latency of the remote call including backoff delays,
    /// excluding resolution and channel construction.
    pub latency: Duration,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub info: CompletionInfo,
}

/// The once-constructed channel: HTTP client bound to a resolved endpoint.
#[derive(Debug)]
struct Channel {
    http: reqwest::Client,
    base_url: String,
}

impl Channel {
    /// Bind a channel to `base_url`. The HTTP client performs no internal
    /// retries; retry is owned by [`crate::network::retry_transient`].
    fn bind(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| GateError::Connection {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best-effort reachability probe of `GET {base}/models`. Logged only;
    /// a failure does not block channel construction.
    async fn probe(&self) {
        let url = format!("{}/models", self.base_url);
        let request = self
            .http
            .get(&url)
            .bearer_auth(NetworkConfig::PLACEHOLDER_API_KEY)
            .timeout(NetworkConfig::PROBE_TIMEOUT);

        match request.send().await {
            Ok(response) => info!("Endpoint probe {}: {}", url, response.status()),
            Err(e) => warn!("Endpoint probe {} failed: {}", url, e),
        }
    }
}

/// Client for the model-serving endpoint.
///
/// Construction is cheap and performs no I/O. Host resolution and channel
/// construction happen once, on the first query; concurrent first callers
/// observe a single construction. The channel is read-only afterwards, so
/// queries from many tasks share it without locking.
pub struct QueryClient {
    channel: OnceCell<Channel>,
    retry: RetryConfig,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    /// Create a client that resolves the endpoint on first use.
    pub fn new() -> Self {
        Self {
            channel: OnceCell::new(),
            retry: RetryConfig::default(),
        }
    }

    /// Create a client pinned to a known base URL, skipping resolution.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let channel = Channel::bind(&base_url.into())?;
        Ok(Self {
            channel: OnceCell::new_with(Some(channel)),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The endpoint this client is bound to, once constructed.
    pub fn base_url(&self) -> Option<&str> {
        self.channel.get().map(|channel| channel.base_url.as_str())
    }

    /// Resolve the host and bind the channel, exactly once per client.
    ///
    /// Single-flight: the first caller resolves and constructs; every other
    /// caller, concurrent or later, waits for and shares the same channel.
    async fn ensure_ready(&self) -> Result<&Channel> {
        self.channel
            .get_or_try_init(|| async {
                let host = resolve_host().await;
                let base_url = format!(
                    "http://{}:{}{}",
                    host,
                    NetworkConfig::INFERENCE_PORT,
                    NetworkConfig::API_BASE_PATH
                );
                info!("Binding inference channel to {}", base_url);
                let channel = Channel::bind(&base_url)?;
                channel.probe().await;
                Ok(channel)
            })
            .await
    }

    /// Run one chat-completion query.
    ///
    /// The message list is assembled from the optional system and user
    /// text; `convert_system_to_user` demotes the system role for backends
    /// that reject it. When `func_spec` is supplied the model is forced to
    /// invoke that function and the output is its decoded argument object;
    /// otherwise the output is the free-text content. The call is retried
    /// only over the transient whitelist; all other failures propagate
    /// unmodified.
    pub async fn query(
        &self,
        system_message: Option<&str>,
        user_message: Option<&str>,
        func_spec: Option<&FunctionSpec>,
        convert_system_to_user: bool,
        options: &ModelOptions,
    ) -> Result<QueryResult> {
        let channel = self.ensure_ready().await?;

        let messages = assemble_messages(system_message, user_message, convert_system_to_user);
        let request = ChatCompletionRequest::assemble(options, messages, func_spec);
        debug!(
            model = %request.model,
            message_count = request.messages.len(),
            forced_function = func_spec.map(|spec| spec.name.as_str()),
            "Sending completion request"
        );

        // Timing covers the remote call and its backoff delays only.
        let t0 = Instant::now();
        let completion =
            retry_transient(&self.retry, || self.execute(channel, &request)).await?;
        let latency = t0.elapsed();

        let output = Self::decode_output(&completion, func_spec)?;

        Ok(QueryResult {
            output,
            latency,
            prompt_tokens: completion.usage.prompt_tokens,
            completion_tokens: completion.usage.completion_tokens,
            info: CompletionInfo {
                system_fingerprint: completion.system_fingerprint,
                model: completion.model,
                created: completion.created,
            },
        })
    }

    /// Issue one attempt of the completion request.
    async fn execute(
        &self,
        channel: &Channel,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion> {
        let url = format!("{}/chat/completions", channel.base_url);

        let response = channel
            .http
            .post(&url)
            .bearer_auth(NetworkConfig::PLACEHOLDER_API_KEY)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            return Err(GateError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(GateError::Server {
                status: status.as_u16(),
                body,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GateError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| GateError::Json {
                message: format!("failed to parse completion response: {}", e),
                source: None,
            })
    }

    /// Decode the first choice into the normalized output shape.
    ///
    /// Output is structured iff `func_spec` was supplied: the response must
    /// then carry a tool invocation whose name matches the requested
    /// function, and its
    /// argument payload must parse as JSON.
    fn decode_output(
        completion: &ChatCompletion,
        func_spec: Option<&FunctionSpec>,
    ) -> Result<QueryOutput> {
        let choice = completion
            .choices
            .first()
            .ok_or_else(|| GateError::ProtocolViolation {
                message: "response contained no choices".to_string(),
            })?;

        let Some(spec) = func_spec else {
            return Ok(QueryOutput::Text(choice.message.content.clone()));
        };

        let calls = choice
            .message
            .tool_calls
            .as_deref()
            .filter(|calls| !calls.is_empty())
            .ok_or_else(|| GateError::ProtocolViolation {
                message: format!(
                    "function call is empty, not a function call: {:?}",
                    choice.message
                ),
            })?;

        let call = &calls[0];
        if call.function.name != spec.name {
            return Err(GateError::ProtocolViolation {
                message: format!(
                    "function name mismatch: requested {:?}, got {:?}",
                    spec.name, call.function.name
                ),
            });
        }

        match serde_json::from_str(&call.function.arguments) {
            Ok(value) => Ok(QueryOutput::Structured(value)),
            Err(e) => {
                error!(
                    "Error decoding function arguments: {}",
                    call.function.arguments
                );
                Err(GateError::MalformedArguments {
                    message: e.to_string(),
                    payload: call.function.arguments.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn completion_with_message(message: serde_json::Value) -> ChatCompletion {
        serde_json::from_value(json!({
            "id": "cmpl-test",
            "model": "mock-model",
            "created": 1_720_000_000,
            "system_fingerprint": "fp_test",
            "choices": [{"message": message, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap()
    }

    fn weather_spec() -> FunctionSpec {
        FunctionSpec::new(
            "get_weather",
            "Report the weather for a city",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )
    }

    #[test]
    fn test_text_output_without_spec() {
        let completion = completion_with_message(json!({"content": "sunny"}));
        let output = QueryClient::decode_output(&completion, None).unwrap();
        assert_eq!(output, QueryOutput::Text(Some("sunny".to_string())));
        assert_eq!(output.as_text(), Some("sunny"));
    }

    #[test]
    fn test_null_content_stays_text() {
        let completion = completion_with_message(json!({}));
        let output = QueryClient::decode_output(&completion, None).unwrap();
        assert_eq!(output, QueryOutput::Text(None));
    }

    #[test]
    fn test_missing_tool_call_is_contract_violation() {
        let completion = completion_with_message(json!({"content": "I would rather chat"}));
        let err = QueryClient::decode_output(&completion, Some(&weather_spec())).unwrap_err();
        assert!(matches!(err, GateError::ProtocolViolation { .. }));
    }

    #[test]
    fn test_tool_name_mismatch_is_contract_violation() {
        let completion = completion_with_message(json!({
            "tool_calls": [{"function": {"name": "other_fn", "arguments": "{}"}}]
        }));
        let err = QueryClient::decode_output(&completion, Some(&weather_spec())).unwrap_err();
        match err {
            GateError::ProtocolViolation { message } => {
                assert!(message.contains("other_fn"));
            }
            other => panic!("expected ProtocolViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_tool_call_decodes_arguments() {
        let completion = completion_with_message(json!({
            "tool_calls": [{
                "function": {"name": "get_weather", "arguments": "{\"city\": \"Paris\"}"}
            }]
        }));
        let output = QueryClient::decode_output(&completion, Some(&weather_spec())).unwrap();
        assert_eq!(output, QueryOutput::Structured(json!({"city": "Paris"})));
        assert_eq!(output.as_structured().unwrap()["city"], "Paris");
    }

    #[test]
    fn test_malformed_arguments_carry_payload() {
        let completion = completion_with_message(json!({
            "tool_calls": [{"function": {"name": "get_weather", "arguments": "{city:}"}}]
        }));
        let err = QueryClient::decode_output(&completion, Some(&weather_spec())).unwrap_err();
        match err {
            GateError::MalformedArguments { payload, .. } => assert_eq!(payload, "{city:}"),
            other => panic!("expected MalformedArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choices_is_contract_violation() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "model": "mock-model",
            "created": 0,
            "choices": [],
            "usage": {"prompt_tokens": 0, "completion_tokens": 0}
        }))
        .unwrap();
        let err = QueryClient::decode_output(&completion, None).unwrap_err();
        assert!(matches!(err, GateError::ProtocolViolation { .. }));
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let client = QueryClient::with_base_url("http://127.0.0.1:8000/v1/").unwrap();
        assert_eq!(client.base_url(), Some("http://127.0.0.1:8000/v1"));
    }

    #[test]
    fn test_base_url_unset_before_first_use() {
        let client = QueryClient::new();
        assert_eq!(client.base_url(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ensure_ready_is_single_flight() {
        let client = Arc::new(QueryClient::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                let channel = client.ensure_ready().await.unwrap();
                (channel as *const Channel as usize, channel.base_url.clone())
            }));
        }

        let mut seen: Vec<(usize, String)> = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }

        // Every caller observed the same construction.
        let (first_ptr, first_url) = seen[0].clone();
        assert!(!first_url.is_empty());
        for (ptr, url) in &seen {
            assert_eq!(*ptr, first_ptr);
            assert_eq!(*url, first_url);
        }
        assert_eq!(client.base_url(), Some(first_url.as_str()));
    }
}
