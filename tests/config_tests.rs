//! Config tests - file and environment layering
//!
//! Kept to a single test: it mutates process environment variables.

use tui_match3::engine::{GameConfig, GameSession, Headless, SessionError, CONFIG_PATH_ENV};

#[test]
fn test_load_layers_file_then_env() {
    let path = std::env::temp_dir().join(format!("match3-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "width": 6, "height": 7, "kinds": 5, "seed": 99, "animation": { "fall_ms": 120 } }"#,
    )
    .unwrap();

    std::env::set_var(CONFIG_PATH_ENV, &path);
    std::env::set_var("MATCH3_HEIGHT", "9");
    std::env::set_var("MATCH3_SEED", "not-a-number");

    let config = GameConfig::load().unwrap();
    assert_eq!(config.width, 6);
    assert_eq!(config.height, 9);
    assert_eq!(config.kinds, 5);
    // Unparsable override is ignored.
    assert_eq!(config.seed, 99);
    assert_eq!(config.animation.fall_ms, 120);
    assert_eq!(config.animation.swap_ms, GameConfig::default().animation.swap_ms);
    assert_eq!(config.palette().len(), 5);

    let session = GameSession::new(config, Headless).unwrap();
    assert_eq!(session.board().width(), 6);
    assert_eq!(session.board().height(), 9);
    assert!(session
        .board()
        .pieces()
        .all(|p| session.config().palette().contains(&p.kind())));

    // An invalid override fails validation.
    std::env::set_var("MATCH3_WIDTH", "2");
    assert!(GameConfig::load().is_err());

    let too_many_kinds = GameConfig {
        kinds: 9,
        ..GameConfig::default()
    };
    assert!(matches!(
        GameSession::new(too_many_kinds, Headless),
        Err(SessionError::Config(_))
    ));

    std::env::set_var(CONFIG_PATH_ENV, path.with_extension("missing"));
    std::env::remove_var("MATCH3_WIDTH");
    assert!(GameConfig::load().is_err());

    for key in [CONFIG_PATH_ENV, "MATCH3_HEIGHT", "MATCH3_SEED"] {
        std::env::remove_var(key);
    }
    let _ = std::fs::remove_file(&path);
    assert_eq!(GameConfig::load().unwrap(), GameConfig::default());
}
