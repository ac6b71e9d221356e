//! Tokenizer module for optional token counting
//!
//! Two interchangeable backends sit behind the [`Provider`] trait: the
//! Anthropic counting API and a local tiktoken encoding. [`TokenCounter`]
//! selects one per run, falls back once to the other when setup fails, and
//! turns every per-call failure into "no count" so aggregation never stops.

mod backend;
mod error;
pub mod provider;

// Re-exports for public API
pub use backend::Backend;
pub use error::{TokenizerError, TokenizerResult};
pub use provider::Provider;

use std::env;

use tracing::{info, warn};

use provider::anthropic::AnthropicProvider;
use provider::tiktoken::TiktokenProvider;

/// Environment variable holding the Anthropic API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Token counting endpoint of the Anthropic API
pub const ANTHROPIC_COUNT_TOKENS_URL: &str = "https://api.anthropic.com/v1/messages/count_tokens";

/// Model identifier used for remote counting unless overridden
pub const DEFAULT_REMOTE_MODEL: &str = "claude-3-5-sonnet-latest";

/// Model whose encoding table is used for local counting
pub const DEFAULT_LOCAL_MODEL: &str = "gpt-4o";

/// Run total above which a size warning is emitted
pub const TOKEN_ADVISORY_THRESHOLD: usize = 80_000;

/// Everything needed to construct either backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSettings {
    /// Backend tried first
    pub preferred: Backend,
    /// Model identifier for the remote API
    pub model: String,
    /// Anthropic API key
    pub api_key: Option<String>,
    /// Remote counting endpoint
    pub endpoint: String,
    /// Model whose local encoding is used
    pub local_model: String,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            preferred: Backend::default(),
            model: DEFAULT_REMOTE_MODEL.to_string(),
            api_key: None,
            endpoint: ANTHROPIC_COUNT_TOKENS_URL.to_string(),
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
        }
    }
}

impl CounterSettings {
    /// Settings for `preferred` and `model`, with the API key read from the environment
    pub fn from_env(preferred: Backend, model: impl Into<String>) -> Self {
        Self {
            preferred,
            model: model.into(),
            api_key: env::var(API_KEY_ENV).ok(),
            ..Self::default()
        }
    }
}

/// Construct the provider for one backend
pub fn create_provider(
    backend: Backend,
    settings: &CounterSettings,
) -> TokenizerResult<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match backend {
        Backend::Anthropic => Box::new(AnthropicProvider::connect(settings)?),
        Backend::Tiktoken => Box::new(TiktokenProvider::new(&settings.local_model)?),
    };
    Ok(provider)
}

/// Token counter selected once per run
///
/// Holds no per-file state; the running total belongs to the caller.
pub struct TokenCounter {
    provider: Option<Box<dyn Provider>>,
}

impl TokenCounter {
    /// A counter that never counts
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    /// Wrap an already constructed provider
    pub fn with_provider(provider: Box<dyn Provider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Select a backend, falling back once to the alternate on failure
    pub fn initialize(settings: &CounterSettings) -> Self {
        let preferred = settings.preferred;
        let error = match create_provider(preferred, settings) {
            Ok(provider) => return Self::announce(provider, settings),
            Err(e) => e,
        };

        let fallback = preferred.alternate();
        warn!(
            "{} token counting initialization failed: {}",
            preferred.label(),
            error
        );
        warn!("Falling back to {}...", fallback.label());

        match create_provider(fallback, settings) {
            Ok(provider) => Self::announce(provider, settings),
            Err(e) => {
                warn!(
                    "{} token counting initialization failed: {}",
                    fallback.label(),
                    e
                );
                warn!("Token counting will be disabled.");
                Self::disabled()
            }
        }
    }

    fn announce(provider: Box<dyn Provider>, settings: &CounterSettings) -> Self {
        match provider.backend() {
            Backend::Anthropic => info!("Using Anthropic API tokenizer with {}", settings.model),
            Backend::Tiktoken => info!(
                "Using tiktoken tokenizer with {} encoder",
                settings.local_model
            ),
        }
        Self::with_provider(provider)
    }

    /// Whether a backend is active
    pub fn is_active(&self) -> bool {
        self.provider.is_some()
    }

    /// The active backend, if any
    pub fn backend(&self) -> Option<Backend> {
        self.provider.as_ref().map(|p| p.backend())
    }

    /// Count tokens in `text`; failures are logged and yield `None`
    pub fn count(&self, text: &str) -> Option<usize> {
        let provider = self.provider.as_ref()?;
        match provider.count_tokens(text) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!("Token counting failed: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("backend", &self.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Simple mock provider that doesn't rely on external dependencies
    struct MockProvider {
        tokens: usize,
    }

    impl Provider for MockProvider {
        fn count_tokens(&self, _text: &str) -> TokenizerResult<usize> {
            Ok(self.tokens)
        }

        fn backend(&self) -> Backend {
            Backend::Anthropic
        }
    }

    // Fails every other call
    struct FlakyProvider {
        calls: AtomicUsize,
    }

    impl Provider for FlakyProvider {
        fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Ok(text.len())
            } else {
                Err(TokenizerError::ApiError("rate limited".to_string()))
            }
        }

        fn backend(&self) -> Backend {
            Backend::Anthropic
        }
    }

    fn offline_settings(preferred: Backend) -> CounterSettings {
        CounterSettings {
            preferred,
            api_key: None,
            ..CounterSettings::default()
        }
    }

    #[test]
    fn test_disabled_counter() {
        let counter = TokenCounter::disabled();
        assert!(!counter.is_active());
        assert_eq!(counter.backend(), None);
        assert_eq!(counter.count("Hello, world!"), None);
    }

    #[test]
    fn test_mock_provider() {
        let counter = TokenCounter::with_provider(Box::new(MockProvider { tokens: 42 }));
        assert!(counter.is_active());
        assert_eq!(counter.count("Hello, world!"), Some(42));
    }

    #[test]
    fn test_call_failures_are_isolated() {
        let counter = TokenCounter::with_provider(Box::new(FlakyProvider {
            calls: AtomicUsize::new(0),
        }));
        assert_eq!(counter.count("abc"), Some(3));
        assert_eq!(counter.count("abc"), None);
        assert_eq!(counter.count("abcd"), Some(4));
        assert!(counter.is_active());
    }

    #[test]
    fn test_local_backend() {
        let counter = TokenCounter::initialize(&offline_settings(Backend::Tiktoken));
        assert_eq!(counter.backend(), Some(Backend::Tiktoken));
        let tokens = counter.count("Hello, world!").unwrap();
        assert!(tokens > 0);
        assert_eq!(counter.count(""), Some(0));
    }

    #[test]
    fn test_missing_api_key_falls_back_to_local() {
        let counter = TokenCounter::initialize(&offline_settings(Backend::Anthropic));
        assert_eq!(counter.backend(), Some(Backend::Tiktoken));
        assert!(counter.count("fn main() {}").is_some());
    }

    #[test]
    fn test_unreachable_api_falls_back_to_local() {
        let settings = CounterSettings {
            preferred: Backend::Anthropic,
            api_key: Some("sk-test".to_string()),
            endpoint: "http://127.0.0.1:9/v1/messages/count_tokens".to_string(),
            ..CounterSettings::default()
        };
        let counter = TokenCounter::initialize(&settings);
        assert_eq!(counter.backend(), Some(Backend::Tiktoken));
    }

    #[test]
    fn test_both_backends_unavailable() {
        let settings = CounterSettings {
            local_model: "no-such-model".to_string(),
            ..offline_settings(Backend::Tiktoken)
        };
        let counter = TokenCounter::initialize(&settings);
        assert!(!counter.is_active());
        assert_eq!(counter.count("anything"), None);
    }

    #[test]
    fn test_unknown_local_model_is_typed_error() {
        let settings = CounterSettings {
            local_model: "no-such-model".to_string(),
            ..CounterSettings::default()
        };
        assert!(matches!(
            create_provider(Backend::Tiktoken, &settings),
            Err(TokenizerError::UnsupportedModel(_))
        ));
        assert!(matches!(
            create_provider(Backend::Anthropic, &settings),
            Err(TokenizerError::EnvVarError(_))
        ));
    }

    #[test]
    #[ignore] // Skip this test by default since it requires an API key
    fn test_claude_tokenizer() {
        let settings = CounterSettings::from_env(Backend::Anthropic, DEFAULT_REMOTE_MODEL);
        if settings.api_key.is_none() {
            println!("Skipping Claude tokenizer test (no API key)");
            return;
        }
        let counter = TokenCounter::initialize(&settings);
        assert_eq!(counter.backend(), Some(Backend::Anthropic));
        assert!(counter.count("Hello, Claude!").unwrap() > 0);
    }
}
