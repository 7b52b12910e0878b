//! Chat-completion client for the hosted text-generation endpoint.
//!
//! The client never returns `Err` from a completion: every failure is turned
//! into a [`CompletionOutcome`] variant, which callers can either inspect or
//! flatten into the displayable text via [`CompletionOutcome::into_text`].

mod client;
mod outcome;

pub use client::{ChatMessage, LlmClient, LlmSettings};
pub use outcome::{CompletionOutcome, MISSING_API_KEY_MESSAGE};
