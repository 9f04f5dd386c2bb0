//! Environment-variable override behavior of `Config::load_from_file`.
//!
//! `std::env::var` mutation is process-global, so these tests run serially
//! to avoid racing each other under parallel test execution.

use otodoki_supply::config::Config;
use serial_test::serial;

#[test]
#[serial]
fn env_vars_override_file_and_defaults() {
    std::env::set_var("OTODOKI_MIN_THRESHOLD", "42");
    std::env::set_var("OTODOKI_COUNTRY", "US");
    std::env::set_var("OTODOKI_ITUNES_TERMS", "foo, bar ,baz");

    let config = Config::load_from_file("/nonexistent/path/config.toml").unwrap();

    assert_eq!(config.otodoki.min_threshold, 42);
    assert_eq!(config.otodoki.country, "US");
    assert_eq!(config.search.itunes_terms, vec!["foo", "bar", "baz"]);

    std::env::remove_var("OTODOKI_MIN_THRESHOLD");
    std::env::remove_var("OTODOKI_COUNTRY");
    std::env::remove_var("OTODOKI_ITUNES_TERMS");
}

#[test]
#[serial]
fn unparsable_numeric_env_var_falls_back_to_default() {
    std::env::set_var("OTODOKI_MIN_THRESHOLD", "not-a-number");

    let config = Config::load_from_file("/nonexistent/path/config.toml").unwrap();

    assert_eq!(config.otodoki.min_threshold, otodoki_supply::config::defaults::default_min_threshold());

    std::env::remove_var("OTODOKI_MIN_THRESHOLD");
}

#[test]
#[serial]
fn zero_floor_env_vars_are_clamped_to_minimum() {
    std::env::set_var("QUEUE_MAX_CAPACITY", "0");
    std::env::set_var("OTODOKI_BATCH_SIZE", "0");

    let config = Config::load_from_file("/nonexistent/path/config.toml").unwrap();

    assert_eq!(config.queue.max_capacity, 1);
    assert_eq!(config.otodoki.batch_size, 1);

    std::env::remove_var("QUEUE_MAX_CAPACITY");
    std::env::remove_var("OTODOKI_BATCH_SIZE");
}
