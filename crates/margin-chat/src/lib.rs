//! Margin Chat — prompt construction and model-agnostic completion dispatch.
//!
//! The prompt builder is pure; the dispatcher picks the model, attaches the
//! optional context image, and hands a provider-agnostic message list to a
//! [`CompletionBackend`]. Provider-specific request shaping lives in
//! `providers`.

pub mod backend;
pub mod dispatch;
pub mod prompt;
pub mod providers;
pub mod types;

pub use backend::CompletionBackend;
pub use dispatch::{dispatch, pick_model};
pub use prompt::build_prompt;
pub use providers::HttpBackend;
pub use types::{ContentPart, Message, MessageContent, PromptPlan, UsedContext};
