//! Chat-completions protocol surface: wire types, function specs, and
//! message-list assembly.

mod function_spec;
mod messages;
mod types;

pub use function_spec::FunctionSpec;
pub use messages::assemble_messages;
pub use types::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, Choice, FunctionCall,
    FunctionDefinition, ModelOptions, ResponseMessage, Role, ToolCallPayload, ToolChoice,
    ToolChoiceFunction, ToolDefinition, Usage,
};
