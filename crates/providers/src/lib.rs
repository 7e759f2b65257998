pub mod openai_compat;
pub mod scripted;
pub mod traits;
pub mod util;

use std::sync::Arc;
use std::time::Duration;

use sq_domain::config::{LlmConfig, ProviderKind};
use sq_domain::error::Result;

// Re-exports for convenience.
pub use openai_compat::OpenAiCompatProvider;
pub use scripted::ScriptedProvider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, Usage};

/// Build the configured provider around a resolved credential.
pub fn create_provider(cfg: &LlmConfig, api_key: String) -> Result<Arc<dyn LlmProvider>> {
    if !util::has_expected_prefix(&api_key, &cfg.expected_key_prefix) {
        tracing::warn!(
            provider = %cfg.provider.id,
            expected_prefix = %cfg.expected_key_prefix,
            "API key does not carry the expected prefix"
        );
    }

    let timeout = Duration::from_millis(cfg.timeout_ms);
    match cfg.provider.kind {
        ProviderKind::OpenaiCompat | ProviderKind::AzureOpenai => Ok(Arc::new(
            OpenAiCompatProvider::from_config(&cfg.provider, api_key, timeout)?,
        )),
    }
}
