//! Typed confirmation for destructive operations.

use std::future::Future;

use crate::error::{Error, Result};
use crate::explorer::host::{HostWindow, InputBoxOptions};
use crate::tree::ExplorerContext;

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ask the user to retype `name`. Only an exact match confirms.
pub async fn confirm_by_name(window: &dyn HostWindow, kind: &str, name: &str) -> Result<bool> {
    let expected = name.to_string();
    let mismatch = format!("{} name does not match", capitalize(kind));
    let options = InputBoxOptions {
        prompt: format!(
            "Are you sure you wish to drop this {kind}? Enter the {kind} name '{name}' to confirm."
        ),
        placeholder: format!("e.g. {name}"),
        validate: Some(Box::new(move |input: &str| {
            if !input.is_empty() && !expected.starts_with(input) {
                Some(mismatch.clone())
            } else {
                None
            }
        })),
    };

    let input = window
        .show_input_box(options)
        .await
        .map_err(|err| Error::Prompt(format!("An error occurred parsing the {kind} name: {err}")))?;

    Ok(matches!(input.as_deref(), Some(typed) if typed == name))
}

/// Confirm, then run `drop`. Remote failures are shown to the user and reported as `false`.
pub async fn drop_with_confirmation<F, Fut>(
    explorer: &ExplorerContext,
    kind: &str,
    name: &str,
    drop: F,
) -> Result<bool>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if !confirm_by_name(explorer.window.as_ref(), kind, name).await? {
        log::debug!("Drop {kind} '{name}' was not confirmed");
        return Ok(false);
    }

    match drop().await {
        Ok(dropped) => {
            if dropped {
                log::info!("Dropped {kind} '{name}'");
            }
            Ok(dropped)
        }
        Err(err) => {
            explorer.notify_error(format!("Drop {kind} failed: {err}"));
            Ok(false)
        }
    }
}
