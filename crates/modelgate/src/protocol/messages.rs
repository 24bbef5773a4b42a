//! Assembly of the ordered message list from optional prompt parts.

use crate::protocol::types::{ChatMessage, Role};

/// Build the message list from optional system and user text.
///
/// The system message, when present, always precedes the user message.
/// `convert_system_to_user` demotes the system text to the user role for
/// serving backends that reject a system role.
pub fn assemble_messages(
    system_message: Option<&str>,
    user_message: Option<&str>,
    convert_system_to_user: bool,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = system_message {
        let role = if convert_system_to_user {
            Role::User
        } else {
            Role::System
        };
        messages.push(ChatMessage::new(role, system));
    }
    if let Some(user) = user_message {
        messages.push(ChatMessage::new(Role::User, user));
    }

    messages
}
