//! Response parsing and text cleanup through the public API.

use postforge_pipeline::{
    ExtractionStrategy, MAX_EMOJI, cap_emoji, draft_from_response, extract_object, parse_draft,
    sanitize,
};

const OBJECT: &str = r##"{"title":"减半之后","body":"BTC 在区块 840000 完成减半。","hashtags":["#BTC"],"tickers":"$BTC","mentions":[],"verifiable_detail":840000}"##;

#[test]
fn test_wrapped_objects_parse_identically() -> anyhow::Result<()> {
    let direct = parse_draft(OBJECT)?;
    let embedded = parse_draft(&format!("Here is your post:\n{}\nEnjoy!", OBJECT))?;
    let fenced = parse_draft(&format!("```json\n{}\n```", OBJECT))?;

    assert_eq!(direct, embedded);
    assert_eq!(direct, fenced);
    assert_eq!(direct.title, "减半之后");
    assert_eq!(direct.tickers, vec!["$BTC".to_string()]);
    assert_eq!(direct.verifiable_detail.as_deref(), Some("840000"));
    assert!(direct.structured);
    Ok(())
}

#[test]
fn test_strategy_order_is_reported() -> anyhow::Result<()> {
    let (strategy, _) = extract_object(OBJECT)?;
    assert_eq!(strategy, ExtractionStrategy::Direct);

    let (strategy, _) = extract_object(&format!("prefix {} suffix", OBJECT))?;
    assert_eq!(strategy, ExtractionStrategy::BalancedBraces);
    Ok(())
}

#[test]
fn test_plain_text_becomes_unstructured_draft() {
    let draft = draft_from_response("  BTC 在区块 840000 完成减半。  ");
    assert!(!draft.structured);
    assert!(draft.title.is_empty());
    assert_eq!(draft.body, "BTC 在区块 840000 完成减半。");
    assert!(extract_object("no json here").is_err());
}

#[test]
fn test_sanitize_is_idempotent_on_messy_text() {
    let inputs = [
        "BTC 稳赚不赔！  区块 840000 已确认。区块 840000 已确认。🚀🚀🚀",
        "Don't miss out!!\n\n\n\nBTC fees fell.  BTC fees fell. 🔥💎🌕",
        "",
        "   ",
    ];
    for input in inputs {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "{input:?}");
    }
}

#[test]
fn test_emoji_cap_keeps_first_emoji() {
    let capped = cap_emoji("🚀a🔥b💎c🌕", MAX_EMOJI);
    assert_eq!(capped, "🚀a🔥bc");
    assert_eq!(sanitize("🚀🚀🚀🚀").chars().count(), MAX_EMOJI);
}
