//! Descriptor for a callable the model is forced to invoke.

use crate::protocol::types::{
    FunctionDefinition, ToolChoice, ToolChoiceFunction, ToolDefinition,
};
use serde_json::Value;

/// Name, description and parameter schema of a function the model must
/// call. Supplied by the caller; read-only here.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object.
    pub parameters: Value,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// The tool declaration advertised to the model.
    pub fn as_tool(&self) -> ToolDefinition {
        ToolDefinition {
            r#type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.parameters.clone(),
            },
        }
    }

    /// The directive forcing the model to invoke exactly this function.
    pub fn forced_choice(&self) -> ToolChoice {
        ToolChoice {
            r#type: "function".to_string(),
            function: ToolChoiceFunction {
                name: self.name.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_declaration_shape() {
        let spec = FunctionSpec::new(
            "submit_review",
            "Submit a review verdict",
            json!({"type": "object", "properties": {"verdict": {"type": "string"}}}),
        );

        let tool = serde_json::to_value(spec.as_tool()).unwrap();
        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], "submit_review");
        assert_eq!(
            tool["function"]["parameters"]["properties"]["verdict"]["type"],
            "string"
        );
    }

    #[test]
    fn test_forced_choice_names_the_function() {
        let spec = FunctionSpec::new("submit_review", "", json!({}));
        let choice = serde_json::to_value(spec.forced_choice()).unwrap();
        assert_eq!(choice["type"], "function");
        assert_eq!(choice["function"]["name"], "submit_review");
    }
}
