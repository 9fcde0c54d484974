//! Integration tests for logging initialisation
//!
//! Installs the global subscriber, so everything is checked from a single
//! test: environment overrides, the file destination and re-initialisation.

use crate::integration::test_utils::{find_message, json_events, named, std_line, ToolSettings, ENV_MUTEX};
use std::fs;
use tempfile::TempDir;
use variant_engine::logging::{init_logging, LoggingConfig};
use variant_engine::{run, EngineError, OutputLine, TracingSink};

#[test]
fn test_file_logging_with_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("state").join("logs").join("engine.log");

    // The configuration asks for warn-level text on stderr; the environment
    // redirects to a JSON file at info level.
    let config = LoggingConfig {
        level: "warn".to_string(),
        format: "text".to_string(),
        output: "stderr".to_string(),
        file: log_path.clone(),
        ..LoggingConfig::default()
    };

    std::env::remove_var("VARIANT_ENGINE_LOG_MODULES");
    std::env::set_var("VARIANT_ENGINE_LOG", "info");
    std::env::set_var("VARIANT_ENGINE_LOG_FORMAT", "json");
    std::env::set_var("VARIANT_ENGINE_LOG_OUTPUT", "file");
    let installed = init_logging(Some(&config));
    std::env::remove_var("VARIANT_ENGINE_LOG");
    std::env::remove_var("VARIANT_ENGINE_LOG_FORMAT");
    std::env::remove_var("VARIANT_ENGINE_LOG_OUTPUT");

    installed.unwrap();
    assert!(log_path.parent().unwrap().is_dir());

    let mut sink = TracingSink;
    run(
        &named(&["logged"]),
        |settings: &ToolSettings| Ok(vec![std_line(settings), OutputLine::err("logged warning")]),
        &mut sink,
        1,
        true,
    )
    .unwrap();

    let events = json_events(&fs::read_to_string(&log_path).unwrap());
    let done = find_message(&events, "logged done").expect("std line in log file");
    assert_eq!(done["level"], "INFO");
    assert_eq!(done["target"], "variant_engine::output");
    let warning = find_message(&events, "logged warning").expect("err line in log file");
    assert_eq!(warning["level"], "ERROR");

    let again = init_logging(Some(&LoggingConfig::default()));
    assert!(matches!(again, Err(EngineError::ConfigError(_))));
}
