//! End-to-end decisions through the public engine API
//!
//! Each test builds the engine from default configuration, the same way the
//! server and CLI do, and checks the whole detect → classify → route chain.

use tolkroute::config::Config;
use tolkroute::detect::DetectionMethod;
use tolkroute::lexicon::LanguageFamily;
use tolkroute::pipeline::DecisionEngine;
use tolkroute::router::{RouteRule, SamplingMode};

fn engine() -> DecisionEngine {
    DecisionEngine::new(&Config::default()).expect("default config should build an engine")
}

#[test]
fn test_zulu_legal_request_escalates_on_paid_tier() {
    let engine = engine();
    let decision = engine.route(Some("pro"), "Sawubona, ngicela usizo ngomthetho wami");

    assert_eq!(decision.language.code(), "zu");
    assert_eq!(decision.language.family(), LanguageFamily::Nguni);
    assert!(
        decision.language.confidence() > 0.4,
        "confidence was {}",
        decision.language.confidence()
    );
    assert!(decision.categories.contains("legal"));

    let plan = &decision.plan;
    assert!(plan.escalated());
    assert_eq!(plan.rule(), RouteRule::Escalated);
    assert_eq!(plan.sampling_mode(), SamplingMode::Reasoning);
    assert_eq!(plan.provider(), "deepseek");
    assert_eq!(plan.model(), "deepseek-reasoner");
    assert!(plan.sampling().temperature() > 0.0);

    let context = plan
        .language_context()
        .expect("isiZulu should attach a language block");
    assert_eq!(context.code, "zu");
    assert!(context.instruction.contains("isiZulu"));
}

#[test]
fn test_english_greeting_on_default_tier() {
    let engine = engine();
    let decision = engine.route(None, "hello how are you");

    assert_eq!(decision.language.code(), "en");
    assert_eq!(decision.language.method(), DetectionMethod::Vocabulary);
    assert!(decision.categories.is_empty());
    assert_eq!(decision.domain, "general");

    let plan = &decision.plan;
    assert_eq!(plan.tier(), "free");
    assert!(!plan.escalated());
    assert_eq!(plan.rule(), RouteRule::Unpaid);
    assert_eq!(plan.max_tokens(), 1024);
    assert_eq!(plan.prompt_variant(), "chat");
    assert!(plan.language_context().is_none());
}

#[test]
fn test_same_message_on_free_tier_does_not_escalate() {
    let engine = engine();
    let decision = engine.route(Some("free"), "Sawubona, ngicela usizo ngomthetho wami");

    assert!(decision.categories.contains("legal"));
    assert!(!decision.plan.escalated());
    assert_eq!(decision.plan.model(), "llama-3.1-8b-instant");
    // the language block is independent of the tier
    assert!(decision.plan.language_context().is_some());
}

#[test]
fn test_document_request_uses_extended_budget_and_domain_prompt() {
    let engine = engine();
    let decision = engine.route(
        Some("starter"),
        "Please draft a business plan for my spaza shop",
    );

    assert!(decision.categories.contains("document_request"));
    assert_eq!(decision.domain, "business");
    assert_eq!(decision.plan.prompt_variant(), "document_business");
    assert_eq!(decision.plan.max_tokens(), 4096);
    assert!(!decision.plan.escalated());
}

#[test]
fn test_thinking_request_keeps_default_variant() {
    let engine = engine();
    let decision = engine.route(Some("pro"), "Can you think carefully and solve this riddle");

    assert!(decision.categories.contains("thinking"));
    let plan = &decision.plan;
    assert_eq!(plan.rule(), RouteRule::Thinking);
    assert!(!plan.escalated());
    assert_eq!(plan.sampling_mode(), SamplingMode::Reasoning);
    assert_eq!(plan.model(), "Qwen/Qwen3-235B-A22B");
}

#[test]
fn test_image_request_prompt_variant() {
    let engine = engine();
    let decision = engine.route(Some("starter"), "Please draw a picture of a baobab tree");

    assert!(decision.categories.contains("image_request"));
    assert_eq!(decision.plan.prompt_variant(), "image");
}

#[test]
fn test_unknown_tier_routes_as_lowest() {
    let engine = engine();
    let decision = engine.route(Some("platinum"), "Explain POPIA compliance for my clinic");

    assert_eq!(decision.plan.tier(), "free");
    assert!(!decision.plan.escalated());
}

#[test]
fn test_venda_message_escalates_on_language_alone() {
    let engine = engine();
    let decision = engine.route(Some("enterprise"), "Ndaa, ndi khou humbela thuso zwavhuḓi");

    assert_eq!(decision.language.code(), "ve");
    assert_eq!(decision.language.method(), DetectionMethod::DistinctiveFeature);
    assert!(decision.plan.escalated());
    assert_eq!(decision.plan.model(), "kimi-k2-thinking");
}

#[test]
fn test_decision_serializes_with_plan() {
    let engine = engine();
    let decision = engine.route(Some("pro"), "Sawubona, ngicela usizo ngomthetho wami");
    let json = serde_json::to_value(&decision).expect("decision should serialize");

    assert_eq!(json["language"]["code"], "zu");
    assert_eq!(json["plan"]["tier"], "pro");
    assert_eq!(json["plan"]["escalated"], true);
    assert_eq!(json["plan"]["fallback"]["provider"], "openrouter");
    assert_eq!(json["categories"][0], "legal");
}
