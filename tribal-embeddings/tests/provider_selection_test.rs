use tribal_core::config::EmbeddingConfig;
use tribal_core::traits::EmbeddingProvider;
use tribal_embeddings::create_provider;

#[test]
fn mock_provider_is_default_and_dimension_matches_config() {
    let config = EmbeddingConfig {
        provider: "mock".to_string(),
        dimensions: 200,
        ..Default::default()
    };
    let provider = create_provider(&config);
    assert_eq!(provider.dimensions(), 200);
    let v = provider.embed("hello world").unwrap();
    assert_eq!(v.len(), 200);
}

#[test]
fn embed_batch_preserves_order() {
    let config = EmbeddingConfig {
        provider: "mock".to_string(),
        dimensions: 64,
        ..Default::default()
    };
    let provider = create_provider(&config);
    let texts = vec![
        "alpha text".to_string(),
        "beta text".to_string(),
        "gamma text".to_string(),
    ];
    let batch = provider.embed_batch(&texts).unwrap();
    for (i, text) in texts.iter().enumerate() {
        assert_eq!(batch[i], provider.embed(text).unwrap());
    }
}
