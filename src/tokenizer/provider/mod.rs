//! Provider implementations for the counting backends

pub mod anthropic;
pub mod tiktoken;

use crate::tokenizer::backend::Backend;
use crate::tokenizer::error::TokenizerResult;

/// Trait for token counting provider implementations
pub trait Provider: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize>;

    /// Backend this provider implements
    fn backend(&self) -> Backend;
}
