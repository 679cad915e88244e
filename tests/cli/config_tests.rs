//! Tests for the `config` and `toggle` CLI commands

use steb::StebConfig;

use super::CliEnv;

#[test]
fn test_config_show_defaults() {
    let env = CliEnv::new();
    let output = env.run_cli_success(&["config", "show"]);
    assert!(output.contains("port = 4404"), "{}", output);
    assert!(output.contains("enabled = false"), "{}", output);
}

#[test]
fn test_config_set_writes_file() {
    let env = CliEnv::new();
    let output = env.run_cli_success(&["config", "set", "listener.port", "5000"]);
    assert_eq!(output.trim(), "Set listener.port = 5000");

    let config = StebConfig::load_from(&env.config_path()).unwrap();
    assert_eq!(config.listener.port, 5000);
}

#[test]
fn test_config_set_out_of_range_port_fails() {
    let env = CliEnv::new();
    let (code, stderr) = env.run_cli_failure(&["config", "set", "listener.port", "1024"]);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("Invalid port 1024"), "{}", stderr);
    assert!(!env.config_path().exists());
}

#[test]
fn test_config_path_prints_location() {
    let env = CliEnv::new();
    let output = env.run_cli_success(&["config", "path"]);
    assert_eq!(output.trim(), env.config_path().display().to_string());
}

#[test]
fn test_toggle_flips_enabled() {
    let env = CliEnv::new();

    let output = env.run_cli_success(&["toggle"]);
    assert!(output.contains("enabled"), "{}", output);
    assert!(StebConfig::load_from(&env.config_path()).unwrap().listener.enabled);

    env.run_cli_success(&["toggle"]);
    assert!(!StebConfig::load_from(&env.config_path()).unwrap().listener.enabled);
}
