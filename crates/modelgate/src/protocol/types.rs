//! Wire types for the chat-completions protocol.
//!
//! These mirror the OpenAI-compatible request and response shapes spoken by
//! local serving backends (vLLM, Ollama, llama.cpp). Optional request
//! fields use `skip_serializing_if` so an absent parameter is dropped from
//! the payload instead of being transmitted as null — several local
//! backends reject explicit nulls.

use crate::protocol::function_spec::FunctionSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Request types ───────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Tool declaration sent in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

/// Function schema within a tool declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Forced tool-choice directive: the model must invoke the named function
/// rather than answer in free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolChoice {
    pub r#type: String,
    pub function: ToolChoiceFunction,
}

/// The function singled out by a [`ToolChoice`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolChoiceFunction {
    pub name: String,
}

/// Recognized remote-call parameters plus a passthrough map for anything
/// backend-specific. Absent values are never transmitted.
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    /// Model identifier as known to the serving backend.
    pub model: String,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Extra parameters forwarded verbatim; null values are dropped.
    pub extra: serde_json::Map<String, Value>,
}

impl ModelOptions {
    /// Create options for the given model with no sampling overrides.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Forward a backend-specific parameter verbatim.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatCompletionRequest {
    /// Assemble a request body. When a [`FunctionSpec`] is supplied it is
    /// injected as the sole available tool together with a forced choice.
    /// Null values in `options.extra` are dropped, not transmitted.
    pub fn assemble(
        options: &ModelOptions,
        messages: Vec<ChatMessage>,
        func_spec: Option<&FunctionSpec>,
    ) -> Self {
        let extra = options
            .extra
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            model: options.model.clone(),
            messages,
            tools: func_spec.map(|spec| vec![spec.as_tool()]),
            tool_choice: func_spec.map(|spec| spec.forced_choice()),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            extra,
        }
    }
}

// ─── Response types ──────────────────────────────────────────────────────

/// Response envelope from `POST {base}/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    pub model: String,
    pub created: i64,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// One completion choice; only the first is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallPayload>>,
}

/// A tool invocation returned by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub function: FunctionCall,
}

/// Function name plus serialized argument payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, parsed by the executor.
    pub arguments: String,
}

/// Token accounting reported by the backend; passed through verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}
