use postforge_core::{GenerationRequest, InboundRequest, LengthBand, PostKind, DEFAULT_MODEL};

#[test]
fn full_payload_deserializes() -> anyhow::Result<()> {
    let inbound: InboundRequest = serde_json::from_str(
        r#"{
            "prompt": "写一条关于手续费市场的帖子",
            "system": "Keep it calm.",
            "model": "mistralai/mistral-7b-instruct",
            "temperature": 0.4,
            "max_tokens": 600,
            "language": "en",
            "token": "sol",
            "mode": "article",
            "min_chars": 950,
            "structured": false,
            "context": {
                "outline": "validators, fees",
                "topic_bank": ["fee burn", "  ", "validator economics"],
                "tags": ["Solana"],
                "tickers": ["SOL"],
                "mentions": ["solana"],
                "persona": "a validator operator"
            }
        }"#,
    )?;

    let request = inbound.into_generation_request(DEFAULT_MODEL)?;
    assert_eq!(request.token(), "SOL");
    assert_eq!(request.language(), "en");
    assert_eq!(request.model(), "mistralai/mistral-7b-instruct");
    assert_eq!(*request.kind(), PostKind::Article);
    assert_eq!(*request.band(), LengthBand::new(950, 1200));
    assert!(!*request.structured());
    assert_eq!(request.topic_bank().len(), 2);
    assert_eq!(request.persona().as_deref(), Some("a validator operator"));
    assert_eq!(request.system().as_deref(), Some("Keep it calm."));
    Ok(())
}

#[test]
fn post_kind_alias_is_accepted() -> anyhow::Result<()> {
    let inbound: InboundRequest =
        serde_json::from_str(r#"{"prompt":"x","postKind":"ARTICLE"}"#)?;
    let request = GenerationRequest::try_from(inbound)?;
    assert_eq!(*request.kind(), PostKind::Article);
    Ok(())
}

#[test]
fn configured_default_model_is_used() -> anyhow::Result<()> {
    let request = InboundRequest::new("x").into_generation_request("openai/gpt-4o-mini")?;
    assert_eq!(request.model(), "openai/gpt-4o-mini");
    Ok(())
}

#[test]
fn setters_build_requests() -> anyhow::Result<()> {
    let request = GenerationRequest::try_from(
        InboundRequest::new("fees")
            .with_token("$eth")
            .with_max_chars(200usize)
            .with_min_chars(100usize),
    )?;
    assert_eq!(request.token(), "ETH");
    assert_eq!(*request.band(), LengthBand::new(100, 200));
    Ok(())
}
