use tempfile::tempdir;
use treequill::config::Config;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.undo_limit, 20);
    assert_eq!(config.new_node_name, "NewNode");
    assert_eq!(config.root_name, "root");
    assert_eq!(config.indent_size, 2);
    assert!(!config.create_backup);
    assert_eq!(config.summary_width, 40);
    assert_eq!(config.draw_key, None);
}

#[test]
fn test_empty_file_is_default() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        undo_limit: 0,
        new_node_name: "Item".to_string(),
        draw_key: Some("definition".to_string()),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "undo_limit = \"many\"").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_config_path_location() {
    if let Some(path) = Config::config_path() {
        assert!(path.ends_with(".config/treequill/config.toml"));
    }
}
