pub mod local_provider;
pub mod mock_provider;
pub mod remote_provider;

pub use local_provider::LocalProvider;
pub use mock_provider::MockProvider;
pub use remote_provider::RemoteProvider;

use tribal_core::config::EmbeddingConfig;
use tribal_core::traits::EmbeddingProvider;

/// Build the configured provider variant. Anything other than `"remote"`
/// or `"local"` falls through to the mock provider — configuration
/// validation is the caller's job; this just needs a sane default.
pub fn create_provider(config: &EmbeddingConfig) -> Box<dyn EmbeddingProvider> {
    match config.provider.as_str() {
        "remote" => Box::new(RemoteProvider::new(
            config.model.clone(),
            config.dimensions,
            config.api_key.clone(),
            config.api_base.clone(),
            config.timeout_ms,
            config.max_retries,
            config.max_backoff_ms,
        )),
        "local" => Box::new(LocalProvider::new(config.dimensions, config.model.clone())),
        _ => Box::new(MockProvider::new(config.dimensions)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_provider_name_falls_back_to_mock() {
        let mut cfg = EmbeddingConfig::default();
        cfg.provider = "unknown".to_string();
        let provider = create_provider(&cfg);
        assert_eq!(provider.model_name(), "mock-word-overlap");
    }

    #[test]
    fn local_provider_is_selected_by_name() {
        let mut cfg = EmbeddingConfig::default();
        cfg.provider = "local".to_string();
        cfg.model = "my-local-model".to_string();
        let provider = create_provider(&cfg);
        assert_eq!(provider.model_name(), "my-local-model");
    }
}
