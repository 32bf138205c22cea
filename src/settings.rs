//! Player settings persisted as JSON next to the executable.
//!
//! Loading never fails hard: missing keys fall back to their defaults through `#[serde(default)]`,
//! a missing file is replaced by the defaults, and a malformed file is reported and ignored.
//! Suspicious values survive loading but are reported by `validate` and clamped by `sanitized`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::screen::{Screen, DEFAULT_TRANSITION_FRAMES};

/// Environment variable that overrides where settings are read from and saved to.
pub const SETTINGS_PATH_ENV: &str = "CODEBREAK_SETTINGS";
pub const DEFAULT_SETTINGS_PATH: &str = "game_settings.json";

/// Step applied by the volume buttons on the settings screen.
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub sound_volume: f32,
    pub music_volume: f32,
    pub screen_shake: bool,
    pub show_damage: bool,
    pub difficulty: Difficulty,
    /// Frames per fade phase.
    pub transition_frames: u32,
    /// Label of the screen shown once loading finishes.
    pub start_screen: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_volume: 0.7,
            music_volume: 0.5,
            screen_shake: true,
            show_damage: true,
            difficulty: Difficulty::Normal,
            transition_frames: DEFAULT_TRANSITION_FRAMES,
            start_screen: Screen::Menu.label().to_owned(),
        }
    }
}

impl GameSettings {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Loads settings, falling back to defaults. A missing file is created with the defaults;
    /// any other problem is returned as a message for the caller to log.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        let path = path.as_ref();
        if !path.exists() {
            let defaults = Self::default();
            let err = defaults
                .save(path)
                .err()
                .map(|e| format!("could not write default settings: {e:#}"));
            return (defaults, err);
        }

        match Self::load_from_file(path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(format!("{e:#}"))),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        fs::write(path, json).with_context(|| format!("writing settings to {}", path.display()))
    }

    /// Non-fatal warnings for values outside their useful range.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(0.0..=1.0).contains(&self.sound_volume) {
            warnings.push(format!(
                "sound_volume {} outside 0.0..=1.0",
                self.sound_volume
            ));
        }
        if !(0.0..=1.0).contains(&self.music_volume) {
            warnings.push(format!(
                "music_volume {} outside 0.0..=1.0",
                self.music_volume
            ));
        }
        if self.transition_frames == 0 {
            warnings.push("transition_frames is 0; using 1".to_owned());
        }
        if let Err(e) = self.start_screen.parse::<Screen>() {
            warnings.push(format!("start_screen: {e}"));
        }
        warnings
    }

    /// Copy with every numeric field clamped into range.
    pub fn sanitized(&self) -> Self {
        Self {
            sound_volume: clamp_volume(self.sound_volume),
            music_volume: clamp_volume(self.music_volume),
            transition_frames: self.transition_frames.max(1),
            ..self.clone()
        }
    }

    pub fn adjust_sound_volume(&mut self, delta: f32) {
        self.sound_volume = step_volume(self.sound_volume, delta);
    }

    pub fn adjust_music_volume(&mut self, delta: f32) {
        self.music_volume = step_volume(self.music_volume, delta);
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Button steps snap to one decimal so repeated presses don't drift.
fn step_volume(volume: f32, delta: f32) -> f32 {
    clamp_volume(((volume + delta) * 10.0).round() / 10.0)
}

/// Where settings live on disk.
#[derive(Resource, Debug, Clone)]
pub struct SettingsPath(pub PathBuf);

impl SettingsPath {
    pub fn from_env() -> Self {
        let path = std::env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
        Self(path)
    }
}

/// Loads settings once at plugin build time so the screen manager can pick up the fade duration.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        let path = SettingsPath::from_env();
        let (settings, err) = GameSettings::load_or_default(&path.0);
        if let Some(err) = err {
            error!("Settings: {err}");
        }
        for warning in settings.validate() {
            warn!("Settings: {warning}");
        }
        info!("Settings loaded from {}", path.0.display());

        app.insert_resource(settings.sanitized()).insert_resource(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_defaults() {
        let file = write_temp(r#"{ "music_volume": 0.2, "difficulty": "Hard" }"#);
        let settings = GameSettings::load_from_file(file.path()).expect("parse settings");
        assert_eq!(settings.music_volume, 0.2);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.sound_volume, GameSettings::default().sound_volume);
        assert_eq!(settings.transition_frames, DEFAULT_TRANSITION_FRAMES);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("settings.json");
        let (settings, err) = GameSettings::load_or_default(&path);
        assert!(err.is_none(), "unexpected error: {err:?}");
        assert_eq!(settings, GameSettings::default());
        assert!(path.exists());
        let reloaded = GameSettings::load_from_file(&path).expect("reload defaults");
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn malformed_file_falls_back() {
        let file = write_temp("{ not json");
        let (settings, err) = GameSettings::load_or_default(file.path());
        assert!(err.is_some());
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn save_persists_changes() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("settings.json");
        let mut settings = GameSettings::default();
        settings.screen_shake = false;
        settings.difficulty = settings.difficulty.next();
        settings.save(&path).expect("save settings");

        let reloaded = GameSettings::load_from_file(&path).expect("reload");
        assert!(!reloaded.screen_shake);
        assert_eq!(reloaded.difficulty, Difficulty::Hard);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nope").join("settings.json");
        assert!(GameSettings::default().save(path).is_err());
    }

    #[test]
    fn validate_and_sanitize_out_of_range_values() {
        let bad = GameSettings {
            sound_volume: 1.5,
            music_volume: -0.3,
            transition_frames: 0,
            start_screen: "credits".to_owned(),
            ..default()
        };
        let joined = bad.validate().join(" | ");
        assert!(joined.contains("sound_volume"));
        assert!(joined.contains("music_volume"));
        assert!(joined.contains("transition_frames"));
        assert!(joined.contains("credits"));

        let clean = bad.sanitized();
        assert_eq!(clean.sound_volume, 1.0);
        assert_eq!(clean.music_volume, 0.0);
        assert_eq!(clean.transition_frames, 1);
    }

    #[test]
    fn sanitize_keeps_in_range_precision() {
        let file = write_temp(r#"{ "music_volume": 0.55, "sound_volume": 0.33 }"#);
        let settings = GameSettings::load_from_file(file.path())
            .expect("parse settings")
            .sanitized();
        assert_eq!(settings.music_volume, 0.55);
        assert_eq!(settings.sound_volume, 0.33);
    }

    #[test]
    fn volume_steps_stay_in_range() {
        let mut settings = GameSettings::default();
        for _ in 0..5 {
            settings.adjust_sound_volume(VOLUME_STEP);
        }
        assert_eq!(settings.sound_volume, 1.0);
        for _ in 0..3 {
            settings.adjust_music_volume(-VOLUME_STEP);
        }
        assert!((settings.music_volume - 0.2).abs() < 1e-6);
        for _ in 0..10 {
            settings.adjust_music_volume(-VOLUME_STEP);
        }
        assert_eq!(settings.music_volume, 0.0);
    }

    #[test]
    fn difficulty_cycles() {
        let mut d = Difficulty::Easy;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(d.label());
            d = d.next();
        }
        assert_eq!(seen, ["Easy", "Normal", "Hard"]);
        assert_eq!(d, Difficulty::Easy);
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tmp");
        f.write_all(contents.as_bytes()).unwrap();
        f
    }
}
