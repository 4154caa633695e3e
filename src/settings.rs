//! Match settings
//!
//! Loaded from JSON. Every field has a default, so a partial file (or `{}`)
//! is a valid configuration.

use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PLAYERS, MIN_PLAYERS};

/// One seat in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Display name; a random call-sign is used when absent
    pub name: Option<String>,
    /// Controlled by the built-in brain instead of input events
    pub autonomous: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            name: None,
            autonomous: true,
        }
    }
}

impl PlayerSettings {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            autonomous: false,
        }
    }

    pub fn ai() -> Self {
        Self::default()
    }
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; the same seed and inputs replay the same match
    pub seed: u64,
    /// Roster in turn order
    pub players: Vec<PlayerSettings>,
    /// Tick limit for headless runs
    pub max_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 1,
            players: vec![PlayerSettings::ai(), PlayerSettings::ai()],
            max_ticks: 200_000,
        }
    }
}

impl Settings {
    /// Roster built from per-seat autonomy flags
    pub fn from_autonomy(seed: u64, autonomous: &[bool]) -> Self {
        Self {
            seed,
            players: autonomous
                .iter()
                .map(|&autonomous| PlayerSettings {
                    name: None,
                    autonomous,
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json).context("invalid settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("bad settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize settings")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len()),
            "roster needs {}..={} players, got {}",
            MIN_PLAYERS,
            MAX_PLAYERS,
            self.players.len()
        );
        ensure!(self.max_ticks > 0, "max_ticks must be positive");
        Ok(())
    }

    /// True when no seat needs input events
    pub fn all_autonomous(&self) -> bool {
        self.players.iter().all(|p| p.autonomous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.all_autonomous());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"seed": 77}"#).unwrap();
        assert_eq!(settings.seed, 77);
        assert_eq!(settings.players.len(), 2);
        assert_eq!(settings.max_ticks, Settings::default().max_ticks);
    }

    #[test]
    fn test_players_from_json() {
        let json = r#"{
            "players": [
                {"name": "ALICE", "autonomous": false},
                {},
                {"autonomous": true}
            ]
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.players[0], PlayerSettings::human("ALICE"));
        assert_eq!(settings.players[1], PlayerSettings::ai());
        assert!(!settings.all_autonomous());
    }

    #[test]
    fn test_roster_size_validated() {
        let one = Settings::from_autonomy(1, &[true]);
        assert!(one.validate().is_err());

        let five = Settings::from_autonomy(1, &[true; 5]);
        assert!(five.validate().is_err());

        assert!(Settings::from_json(r#"{"players": []}"#).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(Settings::from_json("{ not json").is_err());
        assert!(Settings::from_json(r#"{"seed": "abc"}"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_autonomy(9, &[true, false, true]);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/tank-duel.json").unwrap_err();
        assert!(err.to_string().contains("failed to read settings"));
    }
}
