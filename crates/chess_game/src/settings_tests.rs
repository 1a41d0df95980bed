use super::*;

#[test]
fn defaults_pit_a_human_against_the_engine() {
    let settings = PlaySettings::default();
    assert_eq!(settings.white.controller, Controller::Human);
    assert_eq!(settings.black.controller, Controller::Engine);
    assert_eq!(settings.white.think_time_secs, 1);
    assert_eq!(settings.black.think_time(), Duration::from_secs(1));
}

#[test]
fn settings_survive_a_save_and_load() {
    let mut settings = PlaySettings::default();
    settings.white.controller = Controller::Random;
    settings.black.think_time_secs = 5;
    settings.engine.command = Some(PathBuf::from("/usr/games/stockfish"));
    settings.engine.address = Some("127.0.0.1:9011".to_string());

    let path = std::env::temp_dir().join(format!("chess_play_settings_{}.toml", std::process::id()));
    settings.save(&path).unwrap();
    let loaded = PlaySettings::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, settings);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let settings: PlaySettings = toml::from_str(
        "[white]\n\
         controller = \"random\"\n",
    )
    .unwrap();

    assert_eq!(settings.white.controller, Controller::Random);
    assert_eq!(settings.white.think_time_secs, 1);
    assert_eq!(settings.black.controller, Controller::Engine);
    assert_eq!(settings.engine, EngineSettings::default());
}

#[test]
fn zero_think_time_is_rejected() {
    let mut settings = PlaySettings::default();
    settings.black.think_time_secs = 0;

    let err = settings.validate().unwrap_err();
    assert!(err.contains("black"), "error should name the side: {}", err);
}

#[test]
fn load_rejects_a_zero_think_time_file() {
    let path = std::env::temp_dir().join(format!("chess_play_bad_{}.toml", std::process::id()));
    std::fs::write(&path, "[white]\nthink_time_secs = 0\n").unwrap();
    let result = PlaySettings::load(&path);
    let _ = std::fs::remove_file(&path);

    assert!(result.is_err());
}

#[test]
fn controllers_parse_from_their_config_names() {
    assert_eq!("human".parse::<Controller>().unwrap(), Controller::Human);
    assert_eq!("engine".parse::<Controller>().unwrap(), Controller::Engine);
    assert_eq!("random".parse::<Controller>().unwrap(), Controller::Random);
    assert!("stockfish".parse::<Controller>().is_err());
    assert_eq!(Controller::Random.to_string(), "random");
}

#[test]
fn engine_settings_turn_into_an_endpoint() {
    let engine = EngineSettings {
        command: Some(PathBuf::from("/opt/engine")),
        address: Some("localhost:9011".to_string()),
    };
    let endpoint = engine.endpoint();
    assert_eq!(endpoint.command, Some(PathBuf::from("/opt/engine")));
    assert_eq!(endpoint.address, Some("localhost:9011".to_string()));
}

#[test]
fn sides_are_addressable_by_color() {
    let mut settings = PlaySettings::default();
    settings.side_mut(Side::Black).controller = Controller::Random;
    assert_eq!(settings.side(Side::Black).controller, Controller::Random);
    assert_eq!(settings.side(Side::White).controller, Controller::Human);
}
