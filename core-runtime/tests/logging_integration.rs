use core_runtime::logging::{
    init_logging, mask_token, redact_identifier, LogFormat, LogLevel, LoggingConfig,
};

#[test]
fn test_subscriber_installs_once_per_process() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_env_override(false)
        .with_span_events(true);

    init_logging(config.clone()).expect("first initialization succeeds");
    assert!(init_logging(config).is_err());

    let span = tracing::info_span!("play_track", track_id = "42");
    let _entered = span.enter();
    tracing::debug!(generation = 1u64, "stream attached");
}

#[test]
fn test_sign_in_identifiers_are_safe_to_log() {
    let redacted = redact_identifier("listener@example.com");
    assert!(redacted.starts_with('l'));
    assert!(!redacted.contains("example.com"));

    assert_eq!(redact_identifier("listener"), "listener");
}

#[test]
fn test_token_fingerprint_hides_body() {
    let masked = mask_token("abcdefghijklmnopqrstuvwxyz");
    assert!(masked.starts_with("abcd"));
    assert!(!masked.contains("xyz"));
}

#[test]
fn test_default_format_depends_on_build_profile() {
    let expected = if cfg!(debug_assertions) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    };
    assert_eq!(LoggingConfig::default().format, expected);
}
