//! Tests for the OpenRouter client that need no network access, plus one
//! live call behind the `api` feature.

use postforge_core::{CompletionRequestBuilder, Message};
use postforge_error::{PostforgeErrorKind, RetryableError};
use postforge_interface::CompletionDriver;
use postforge_models::OpenRouterClient;
use postforge_rate_limit::UpstreamConfig;

#[test]
fn test_missing_api_key_is_config_error() {
    let config = UpstreamConfig {
        api_key_env: "POSTFORGE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        ..UpstreamConfig::default()
    };

    let err = OpenRouterClient::from_config(&config).unwrap_err();
    assert!(matches!(err.kind(), PostforgeErrorKind::Config(_)));
    assert!(err.to_string().contains("POSTFORGE_TEST_KEY_THAT_IS_NEVER_SET"));
}

#[test]
fn test_client_uses_config_values() {
    let config = UpstreamConfig {
        default_model: "mistralai/mistral-7b-instruct".to_string(),
        ..UpstreamConfig::default()
    };
    let client = OpenRouterClient::with_api_key("sk-test", &config);

    assert_eq!(client.provider_name(), "openrouter");
    assert_eq!(client.model_name(), "mistralai/mistral-7b-instruct");
    assert!(!format!("{:?}", client).contains("sk-test"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_retryable_network_error() -> anyhow::Result<()> {
    let config = UpstreamConfig {
        endpoint: "http://127.0.0.1:9/api/v1/chat/completions".to_string(),
        ..UpstreamConfig::default()
    };
    let client = OpenRouterClient::with_api_key("sk-test", &config);
    let request = CompletionRequestBuilder::default()
        .model("meta-llama/llama-3.1-8b-instruct")
        .messages(vec![Message::user("hello")])
        .build()?;

    let err = client.complete(&request).await.unwrap_err();
    assert!(matches!(err.kind(), PostforgeErrorKind::Upstream(_)));
    assert!(err.is_retryable());
    Ok(())
}

#[cfg_attr(not(feature = "api"), ignore)]
#[tokio::test]
async fn test_live_completion() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let client = OpenRouterClient::from_config(&UpstreamConfig::default())?;
    let request = CompletionRequestBuilder::default()
        .model(client.model_name())
        .messages(vec![Message::user("Reply with the single word: pong")])
        .max_tokens(16u32)
        .build()?;

    let response = client.complete(&request).await?;
    assert!(!response.text.is_empty());
    Ok(())
}
