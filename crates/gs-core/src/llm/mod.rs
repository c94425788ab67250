//! LLM completion client and wire types
//!
//! Supports Gemini, Claude and OpenAI-compatible APIs behind a single
//! text-in, text-out call.

mod client;
mod types;

pub use client::LlmClient;
pub use types::*;
