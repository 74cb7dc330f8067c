//! Relevance classification of article titles.
//!
//! [`RelevanceClassifier`] builds the prompt, sends it through a
//! [`CompletionClient`] and parses the free-text reply into an [`Assessment`];
//! [`decide`] maps an assessment to the new article status.

pub mod client;
pub mod decision;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod parse;
pub mod prompt;


pub use client::{ClassifierSettings, CompletionClient, HttpCompletionClient, RelevanceClassifier};
pub use decision::{DecisionPolicy, Verdict, decide};
pub use error::InferenceError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCompletionClient;
pub use parse::{Assessment, extract_score, is_region_related};
pub use prompt::{
    SYSTEM_PROMPT, build_messages, excerpt, message_text, user_content, user_prompt,
};
