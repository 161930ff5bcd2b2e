//! What the explorer needs from the host window.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::StatusMessage;

/// Live validation for an input box; `Some(message)` marks the text invalid.
pub type InputValidator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct InputBoxOptions {
    pub prompt: String,
    pub placeholder: String,
    pub validate: Option<InputValidator>,
}

impl InputBoxOptions {
    pub fn validation_message(&self, input: &str) -> Option<String> {
        self.validate.as_ref().and_then(|validate| validate(input))
    }
}

impl std::fmt::Debug for InputBoxOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBoxOptions")
            .field("prompt", &self.prompt)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait HostWindow: Send + Sync {
    /// Show a transient notice.
    fn show_message(&self, message: StatusMessage);

    /// Ask for free text. `Ok(None)` means the user dismissed the box.
    async fn show_input_box(&self, options: InputBoxOptions) -> Result<Option<String>>;
}
