use secrecy::ExposeSecret;

use reelsmith::config::{Config, DEFAULT_MEDIA_API_BASE, DEFAULT_SYNC_API_BASE};

// Environment variables are process-wide, so missing-var and loaded-var
// checks live in one test to keep them from racing each other.
#[test]
fn config_from_env_requires_keys_and_applies_defaults() {
    unsafe {
        std::env::remove_var("MEDIA_API_KEY");
        std::env::remove_var("SYNC_API_KEY");
        std::env::remove_var("MEDIA_API_BASE");
        std::env::remove_var("SYNC_API_BASE");
        std::env::remove_var("REELSMITH_WORK_DIR");
    }

    let missing = Config::from_env();
    assert!(missing.is_err());

    unsafe {
        std::env::set_var("MEDIA_API_KEY", "test-media-key");
        std::env::set_var("SYNC_API_KEY", "test-sync-key");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.media_api_key.expose_secret(), "test-media-key");
    assert_eq!(config.sync_api_key.expose_secret(), "test-sync-key");
    assert_eq!(config.media_api_base, DEFAULT_MEDIA_API_BASE);
    assert_eq!(config.sync_api_base, DEFAULT_SYNC_API_BASE);
    assert!(!config.log_level.is_empty());

    // Clean up
    unsafe {
        std::env::remove_var("MEDIA_API_KEY");
        std::env::remove_var("SYNC_API_KEY");
    }
}
