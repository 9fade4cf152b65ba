//! Model selection and completion dispatch.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use margin_core::Result;

use crate::backend::CompletionBackend;
use crate::types::{ContentPart, Message, PromptPlan};

/// Use the requested model verbatim when present and non-blank, otherwise
/// the configured default.
pub fn pick_model(requested: Option<&str>, default_model: &str) -> String {
    match requested.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => default_model.to_string(),
    }
}

/// Issue a completion for the prompt plan, attaching the context image when
/// one was resolved. Returns the chosen model and the answer text.
pub async fn dispatch(
    backend: &dyn CompletionBackend,
    requested_model: Option<&str>,
    default_model: &str,
    plan: &PromptPlan,
    image_path: Option<&Path>,
) -> Result<(String, String)> {
    let chosen = pick_model(requested_model, default_model);

    let user_message = match image_path {
        Some(path) => {
            let bytes = tokio::fs::read(path).await?;
            let data = STANDARD.encode(bytes);
            Message::user_parts(vec![
                ContentPart::Text {
                    text: plan.user.clone(),
                },
                ContentPart::Image {
                    data,
                    mime: "image/png".to_string(),
                },
            ])
        }
        None => Message::user(plan.user.clone()),
    };

    let messages = vec![Message::system(plan.system.clone()), user_message];

    info!(
        model = %chosen,
        multimodal = image_path.is_some(),
        "dispatching completion"
    );

    let answer = backend.complete(&chosen, &messages).await?;
    Ok((chosen, answer))
}
