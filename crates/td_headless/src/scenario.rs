//! Configuration loading.
//!
//! A scenario is a [`GameConfig`] snapshot on disk, either in the camelCase
//! JSON the game ships with or in RON. Loaded configs are validated before
//! they are handed out.

use std::path::Path;

use thiserror::Error;

use td_core::data::GameConfig;
use td_core::error::GameError;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse JSON.
    #[error("Failed to parse JSON scenario: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Failed to parse RON.
    #[error("Failed to parse RON scenario: {0}")]
    RonError(#[from] ron::error::SpannedError),
    /// Parsed, but not a playable configuration.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] GameError),
}

/// On-disk encoding of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// camelCase JSON.
    #[default]
    Json,
    /// Rusty Object Notation.
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a file extension. Anything but `.ron` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Self::Ron,
            _ => Self::Json,
        }
    }
}

/// Load and validate a scenario file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GameConfig, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents, ConfigFormat::from_path(path))?;

    tracing::info!(
        path = %path.display(),
        waypoints = config.path.waypoints.len(),
        waves = config.waves.len(),
        tower_types = config.tower_types.len(),
        "Scenario loaded"
    );
    Ok(config)
}

/// Parse and validate scenario text.
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<GameConfig, ScenarioError> {
    let config: GameConfig = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Ron => ron::from_str(contents)?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use td_core::path::PathKind;

    const MINIMAL_JSON: &str = r#"{
        "initialBudget": 300,
        "initialLives": 5,
        "path": { "waypoints": [ { "x": 0, "y": 0 }, { "x": 100, "y": 0 } ] },
        "towerTypes": [ { "id": 1, "name": "Arrow", "cost": 50, "range": 120, "damage": 20, "attackCooldown": 0.5 } ]
    }"#;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.ron")), ConfigFormat::Ron);
        assert_eq!(ConfigFormat::from_path(Path::new("a.RON")), ConfigFormat::Ron);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("game-config")), ConfigFormat::Json);
    }

    #[test]
    fn test_parse_json() {
        let config = parse_config(MINIMAL_JSON, ConfigFormat::Json).unwrap();
        assert_eq!(config.initial_budget, 300);
        assert_eq!(config.path.kind, PathKind::Spline);
        assert_eq!(config.tower_types[0].attack_cooldown, 0.5);
    }

    #[test]
    fn test_parse_ron() {
        let ron = r#"(
            initialBudget: 250,
            initialLives: 3,
            path: (
                waypoints: [(x: 0.0, y: 0.0), (x: 50.0, y: 50.0)],
                kind: polyline,
            ),
        )"#;
        let config = parse_config(ron, ConfigFormat::Ron).unwrap();
        assert_eq!(config.initial_lives, 3);
        assert_eq!(config.path.kind, PathKind::Polyline);
        assert_eq!(config.path.waypoints.len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{ "path": { "waypoints": [] } }"#;
        let err = parse_config(json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(GameError::EmptyPath)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = parse_config("{ not json", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ScenarioError::JsonError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(MINIMAL_JSON.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.initial_lives, 5);
    }

    #[test]
    fn test_ron_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standard.ron");
        let original = td_test_utils::fixtures::standard_config();
        std::fs::write(&path, ron::ser::to_string(&original).unwrap()).unwrap();

        assert_eq!(load_config(&path).unwrap(), original);
    }
}
