use mockito::{Matcher, Server, ServerGuard};
use palettegen::config::{Config, ProviderKind};
use palettegen::{resolve_ai_palette, Advisory, FallbackResolver, PaletteError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn completion(content: &str) -> String {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn config_for(server: &ServerGuard, providers: Vec<ProviderKind>) -> Config {
    let mut config = Config::default();
    config.endpoints.github_models = server.url();
    config.endpoints.gemini = server.url();
    config.credentials.github_token = Some("test-token".to_string());
    config.credentials.gemini_api_key = Some("test-key".to_string());
    config.resolver.providers = providers;
    config
}

fn model(name: &str) -> Matcher {
    Matcher::PartialJson(json!({ "model": name }))
}

#[tokio::test]
async fn test_sunset_resolved_by_primary() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("POST", "/chat/completions")
        .match_query(Matcher::UrlEncoded(
            "api-version".to_string(),
            "2024-12-01-preview".to_string(),
        ))
        .match_body(Matcher::AllOf(vec![
            model("openai/o4-mini"),
            Matcher::Regex("Theme description: sunset".to_string()),
        ]))
        .with_status(200)
        .with_body(completion(
            r##"["#FF5733","#C70039","#900C3F","#581845","#FFC300"]"##,
        ))
        .expect(1)
        .create_async()
        .await;
    let secondary = server
        .mock("POST", "/chat/completions")
        .match_body(model("xai/grok-3-mini"))
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, vec![ProviderKind::O4Mini, ProviderKind::Grok3Mini]);
    let resolver = FallbackResolver::from_config(&config).unwrap();
    let resolution = resolve_ai_palette(&resolver, "sunset").await.unwrap();

    primary.assert_async().await;
    secondary.assert_async().await;
    assert_eq!(
        resolution.palette.colors(),
        ["#FF5733", "#C70039", "#900C3F", "#581845", "#FFC300"]
    );
    assert_eq!(resolution.provider_used, "O4-Mini");
    assert_eq!(resolution.advisory(), None);
}

#[tokio::test]
async fn test_rate_limited_primary_falls_back_to_prose_secondary() {
    let mut server = Server::new_async().await;
    let _primary = server
        .mock("POST", "/chat/completions")
        .match_query(Matcher::Any)
        .match_body(model("openai/o4-mini"))
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .create_async()
        .await;
    let _secondary = server
        .mock("POST", "/chat/completions")
        .match_body(model("xai/grok-3-mini"))
        .with_status(200)
        .with_body(completion(
            "Here are your colors: #111111 #222222 #333333 #444444 #555555 enjoy!",
        ))
        .create_async()
        .await;

    let config = config_for(&server, vec![ProviderKind::O4Mini, ProviderKind::Grok3Mini]);
    let resolver = FallbackResolver::from_config(&config).unwrap();
    let resolution = resolve_ai_palette(&resolver, "sunset").await.unwrap();

    assert_eq!(
        resolution.palette.colors(),
        ["#111111", "#222222", "#333333", "#444444", "#555555"]
    );
    assert_eq!(resolution.provider_used, "Grok-3-Mini");
    assert!(resolution.advisories.contains(&Advisory::RateLimited {
        provider: "O4-Mini".to_string()
    }));
    assert!(resolution.advisory().unwrap().contains("rate limited"));
}

#[tokio::test]
async fn test_both_providers_fail() {
    let mut server = Server::new_async().await;
    let _primary = server
        .mock("POST", "/chat/completions")
        .match_query(Matcher::Any)
        .match_body(model("openai/o4-mini"))
        .with_status(429)
        .create_async()
        .await;
    let _secondary = server
        .mock("POST", "/chat/completions")
        .match_body(model("xai/grok-3-mini"))
        .with_status(200)
        .with_body(completion("I cannot help with that."))
        .create_async()
        .await;

    let config = config_for(&server, vec![ProviderKind::O4Mini, ProviderKind::Grok3Mini]);
    let resolver = FallbackResolver::from_config(&config).unwrap();
    let err = resolve_ai_palette(&resolver, "sunset").await.unwrap_err();

    match err {
        PaletteError::Exhausted {
            message,
            rate_limited,
            failures,
        } => {
            assert_eq!(message, "could not parse 5 hex codes");
            assert!(rate_limited);
            assert_eq!(failures[0].status, Some(429));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deepseek_then_gemini_chain() {
    let mut server = Server::new_async().await;
    // Six colors is one too many for the exact-count policy
    let _deepseek = server
        .mock("POST", "/chat/completions")
        .match_body(model("deepseek/DeepSeek-R1-0528"))
        .with_status(200)
        .with_body(completion(
            r##"["#000001","#000002","#000003","#000004","#000005","#000006"]"##,
        ))
        .create_async()
        .await;
    let _gemini = server
        .mock("POST", "/models/gemini-1.5-pro:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_body(
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "['#0b3c5d', '#328cc1', '#d9b310', '#1d2731', '#f2f2f2']" }] }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = config_for(&server, vec![ProviderKind::DeepSeekR1, ProviderKind::Gemini]);
    let resolver = FallbackResolver::from_config(&config).unwrap();
    assert_eq!(resolver.provider_names(), vec!["DeepSeek-R1", "Gemini"]);

    let resolution = resolve_ai_palette(&resolver, "ocean at dusk").await.unwrap();
    assert_eq!(resolution.provider_used, "Gemini");
    assert_eq!(
        resolution.palette.colors(),
        ["#0b3c5d", "#328cc1", "#d9b310", "#1d2731", "#f2f2f2"]
    );
    assert_eq!(
        resolution.advisory().unwrap(),
        "DeepSeek-R1 failed. Used Gemini as fallback."
    );
}

#[tokio::test]
async fn test_huggingface_as_secondary_without_token() {
    let mut server = Server::new_async().await;
    let _primary = server
        .mock("POST", "/chat/completions")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let hf = server
        .mock("POST", "/models/palette-model")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(json!({ "generated_text": r##"["#264653","#2a9d8f","#e9c46a","#f4a261","#e76f51"]"## }).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut config = config_for(&server, vec![ProviderKind::O4Mini, ProviderKind::HuggingFace]);
    config.endpoints.huggingface = format!("{}/models/palette-model", server.url());
    let resolver = FallbackResolver::from_config(&config).unwrap();
    let resolution = resolve_ai_palette(&resolver, "desert").await.unwrap();

    hf.assert_async().await;
    assert_eq!(resolution.provider_used, "HuggingFace");
    assert_eq!(
        resolution.palette.colors(),
        ["#264653", "#2a9d8f", "#e9c46a", "#f4a261", "#e76f51"]
    );
    assert_eq!(
        resolution.advisory().unwrap(),
        "O4-Mini failed. Used HuggingFace as fallback."
    );
}
