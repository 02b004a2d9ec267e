//! AI Integration Layer
//!
//! Prompt construction, provider access and response normalization for
//! complexity analysis.

pub mod normalize;
pub mod prompt;
pub mod provider;

pub use normalize::normalize;
pub use prompt::{PromptBuilder, PromptSection, build_prompt};
pub use provider::{
    ChainConfig, ChainOutcome, ChainStats, ChainedProvider, ChatOptions, ChatProvider,
    ChatSession, HttpChatSession, ProviderChain, SharedProvider, TextEndpointProvider,
    TextProvider, create_chain,
};
