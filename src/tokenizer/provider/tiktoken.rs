//! Offline tokenizer implementation using tiktoken

use tiktoken_rs::CoreBPE;

use super::Provider;
use crate::tokenizer::backend::Backend;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};

/// tiktoken tokenizer implementation
pub struct TiktokenProvider {
    encoding: CoreBPE,
}

impl TiktokenProvider {
    /// Resolve the encoding table for `model`
    pub fn new(model: &str) -> TokenizerResult<Self> {
        let encoding = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| TokenizerError::UnsupportedModel(format!("{}: {}", model, e)))?;

        Ok(Self { encoding })
    }
}

impl Provider for TiktokenProvider {
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
        let tokens = self.encoding.encode_ordinary(text);
        Ok(tokens.len())
    }

    fn backend(&self) -> Backend {
        Backend::Tiktoken
    }
}
