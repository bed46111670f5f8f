//! Integration tests for the `tolkroute config` template

use std::fs;
use tempfile::TempDir;
use tolkroute::cli::generate_config_template;
use tolkroute::config::Config;
use tolkroute::pipeline::DecisionEngine;

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

#[test]
fn test_generated_template_creates_valid_config_file() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, generate_config_template()).expect("Failed to write template");

    let config =
        Config::from_file(&config_path).expect("Generated template should load as valid Config");

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.observability.log_level, "info");
    let names: Vec<&str> = config.tiers.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["free", "starter", "pro", "enterprise"]);
}

#[test]
fn test_template_config_builds_an_engine() {
    let config: Config = generate_config_template().parse().unwrap();
    let engine = DecisionEngine::new(&config).expect("template should build an engine");

    let decision = engine.route(Some("enterprise"), "Sawubona, ngicela usizo ngomthetho wami");
    assert_eq!(decision.plan.model(), "kimi-k2-thinking");
}

#[test]
fn test_template_file_content_matches_generation() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");

    let template = generate_config_template();
    fs::write(&config_path, template).expect("Failed to write template");

    let content = fs::read_to_string(&config_path).expect("Failed to read back");
    assert_eq!(content, template);
}

#[test]
fn test_edited_template_changes_routing() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    let edited = generate_config_template()
        .replace("default_tier = \"free\"", "default_tier = \"pro\"");
    fs::write(&config_path, edited).unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let engine = DecisionEngine::new(&config).unwrap();
    assert_eq!(engine.route(None, "hello").plan.tier(), "pro");
}
