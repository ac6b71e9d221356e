//! Counting backend selection

use clap::ValueEnum;
use strum::{Display, EnumString};

/// Token counting backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// Anthropic token counting API (network, API key)
    #[default]
    Anthropic,
    /// Local tiktoken encoding table (offline)
    Tiktoken,
}

impl Backend {
    /// The backend tried when this one cannot be initialized
    pub fn alternate(self) -> Self {
        match self {
            Backend::Anthropic => Backend::Tiktoken,
            Backend::Tiktoken => Backend::Anthropic,
        }
    }

    /// Human-readable name used in run summaries
    pub fn label(self) -> &'static str {
        match self {
            Backend::Anthropic => "Anthropic API",
            Backend::Tiktoken => "tiktoken",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        assert_eq!(Backend::Anthropic.to_string(), "anthropic");
        assert_eq!("tiktoken".parse::<Backend>().unwrap(), Backend::Tiktoken);
        assert!("huggingface".parse::<Backend>().is_err());
        assert_eq!(Backend::default(), Backend::Anthropic);
    }

    #[test]
    fn test_alternate_is_an_involution() {
        for backend in [Backend::Anthropic, Backend::Tiktoken] {
            assert_ne!(backend.alternate(), backend);
            assert_eq!(backend.alternate().alternate(), backend);
        }
    }
}
