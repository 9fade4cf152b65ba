//! Prompt construction from a resolved selection.
//!
//! Pure function of its inputs: no I/O, no clock, no randomness. The image
//! variant never embeds image bytes in the prompt text; attachment is the
//! dispatcher's job.

use margin_resolve::ResolvedContext;

use crate::types::{PromptPlan, UsedContext};

const SYSTEM_PROMPT: &str = "You are a helpful learning assistant for PDFs and research papers. \
     Answer ONLY using the provided selection context. \
     If the selection is insufficient, ask a clarifying question.";

/// Build the prompt plan for a question about a resolved selection.
pub fn build_prompt(user_query: &str, context: &ResolvedContext) -> PromptPlan {
    match context {
        ResolvedContext::Text { page, content } => PromptPlan {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "User question: {user_query}\n\nSelected text (page {page}):\n{content}"
            ),
            used_context: UsedContext::Text {
                page: *page,
                // Characters, not bytes: multi-byte text must not inflate the count.
                chars: content.chars().count(),
            },
        },
        ResolvedContext::Image { page, .. } => PromptPlan {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "User question: {user_query}\n\nSelected image crop from page {page}. \
                 Explain what it shows. If it contains math, explain step-by-step."
            ),
            used_context: UsedContext::Image { page: *page },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn text_plan_embeds_question_page_and_content() {
        let ctx = ResolvedContext::Text {
            page: 3,
            content: "Some selected snippet".to_string(),
        };
        let plan = build_prompt("Explain this", &ctx);

        assert!(plan.system.contains("ONLY using the provided selection context"));
        assert!(plan.user.contains("User question: Explain this"));
        assert!(plan.user.contains("Selected text (page 3):"));
        assert!(plan.user.contains("Some selected snippet"));
        assert_eq!(plan.used_context, UsedContext::Text { page: 3, chars: 21 });
    }

    #[test]
    fn image_plan_mentions_page_but_never_the_file() {
        let ctx = ResolvedContext::Image {
            page: 2,
            path: PathBuf::from("/data/images/crop_deadbeef0123.png"),
        };
        let plan = build_prompt("What is this diagram?", &ctx);

        assert!(plan.user.contains("Selected image crop from page 2"));
        assert!(plan.user.contains("step-by-step"));
        assert!(!plan.user.contains("crop_deadbeef0123"));
        assert_eq!(plan.used_context, UsedContext::Image { page: 2 });
    }

    #[test]
    fn text_plan_counts_characters_not_bytes() {
        let ctx = ResolvedContext::Text {
            page: 1,
            content: "é → abc".to_string(),
        };
        let plan = build_prompt("q", &ctx);
        assert_eq!(plan.used_context, UsedContext::Text { page: 1, chars: 7 });
    }

    #[test]
    fn build_prompt_is_pure() {
        let ctx = ResolvedContext::Text {
            page: 1,
            content: "abc".to_string(),
        };
        assert_eq!(build_prompt("q", &ctx), build_prompt("q", &ctx));
    }

    #[test]
    fn used_context_serializes_with_type_tag() {
        let text = serde_json::to_value(UsedContext::Text { page: 1, chars: 21 }).unwrap();
        assert_eq!(
            text,
            serde_json::json!({"type": "text", "page": 1, "chars": 21})
        );

        let image = serde_json::to_value(UsedContext::Image { page: 1 }).unwrap();
        assert_eq!(image, serde_json::json!({"type": "image", "page": 1}));
    }
}
