//! Tests for command line parsing into `Config`.

use std::time::Duration;

use clap::Parser;
use jokes_on_tap::config::{LogFormat, LogLevel};
use jokes_on_tap::{Config, Opt};

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["jokes_on_tap"];
    argv.extend_from_slice(args);
    Config::from(Opt::try_parse_from(argv).expect("arguments should parse"))
}

#[test]
fn test_no_arguments_gives_defaults() {
    let config = parse(&[]);
    let defaults = Config::default();

    assert_eq!(config.port, defaults.port);
    assert_eq!(config.names_url, defaults.names_url);
    assert_eq!(config.jokes_url, defaults.jokes_url);
    assert_eq!(config.pipeline, defaults.pipeline);
    assert!(config.validate().is_ok());
}

#[test]
fn test_pipeline_flags() {
    let config = parse(&[
        "--budget-count",
        "3",
        "--window-seconds",
        "30",
        "--queue-capacity",
        "50",
        "--pop-timeout-seconds",
        "2",
        "--cooldown-seconds",
        "20",
        "--backpressure-millis",
        "250",
    ]);

    assert_eq!(config.pipeline.budget_count, 3);
    assert_eq!(config.pipeline.window_duration, Duration::from_secs(30));
    assert_eq!(config.pipeline.queue_capacity, 50);
    assert_eq!(config.pipeline.pop_timeout, Duration::from_secs(2));
    assert_eq!(config.pipeline.cooldown_duration, Duration::from_secs(20));
    assert_eq!(
        config.pipeline.backpressure_interval,
        Duration::from_millis(250)
    );
}

#[test]
fn test_short_port_flag_and_logging() {
    let config = parse(&["-p", "9000", "--log-level", "debug", "--log-format", "json"]);

    assert_eq!(config.port, 9000);
    assert!(matches!(config.log_level, LogLevel::Debug));
    assert!(matches!(config.log_format, LogFormat::Json));
}

#[test]
fn test_pretty_json_log_format_and_server_timeouts() {
    let config = parse(&[
        "--log-format",
        "json-pretty",
        "--header-read-timeout-seconds",
        "5",
        "--request-timeout-seconds",
        "20",
    ]);

    assert!(matches!(config.log_format, LogFormat::JsonPretty));
    assert_eq!(config.server.header_read, Duration::from_secs(5));
    assert_eq!(config.server.request, Duration::from_secs(20));
}

#[test]
fn test_parsed_equal_cooldown_and_backpressure_fails_validation() {
    let config = parse(&["--cooldown-seconds", "1", "--backpressure-millis", "1000"]);
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Opt::try_parse_from(["jokes_on_tap", "--port", "not-a-port"]).is_err());
    assert!(Opt::try_parse_from(["jokes_on_tap", "--log-level", "loud"]).is_err());
    assert!(Opt::try_parse_from(["jokes_on_tap", "--budget-count", "-1"]).is_err());
}

#[test]
fn test_parsed_zero_budget_fails_validation() {
    let config = parse(&["--budget-count", "0"]);
    assert!(config.validate().is_err());
}
