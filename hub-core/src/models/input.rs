//! Input DTOs with garde validation for the portal service layer.

use garde::Validate;
use serde::Deserialize;

use super::message::ChatKind;

/// Validation constants
const MAX_CHAT_ID_LENGTH: usize = 256;
const MAX_MESSAGE_LENGTH: usize = 10000;
const MAX_MESSAGE_ID_LENGTH: usize = 128;
const MAX_URL_LENGTH: usize = 2048;

/// Input for sending a message to the selected conversation.
///
/// An empty body is valid here: empty drafts are silently dropped by the
/// composer rather than rejected as a validation error.
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct SendMessageInput {
    #[garde(skip)]
    pub kind: ChatKind,
    #[garde(length(min = 1, max = MAX_CHAT_ID_LENGTH))]
    pub chat_id: String,
    #[garde(length(max = MAX_MESSAGE_LENGTH))]
    pub body: String,
    #[garde(inner(length(min = 1, max = MAX_MESSAGE_ID_LENGTH)))]
    pub reply_to_id: Option<String>,
}

/// Input for updating the outbound webhook target.
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct SetWebhookInput {
    #[garde(length(max = MAX_URL_LENGTH))]
    pub url: String,
}

/// Helper trait to convert garde validation errors to String
pub trait ValidateExt {
    fn validate_input(&self) -> Result<(), String>;
}

impl<T: Validate<Context = ()>> ValidateExt for T {
    fn validate_input(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}
