//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Whether an optional speech capability is wired at all.
///
/// `Simulated` selects the shipped stand-in implementation
/// (`ScriptedRecognizer` / `TimedSynthesizer`); `Disabled` exercises the
/// degraded paths: fixed-delay auto-advance for recognition, an
/// "unsupported" status for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Simulated,
    Disabled,
}

impl Default for Capability {
    fn default() -> Self {
        Self::Simulated
    }
}

// ---------------------------------------------------------------------------
// FieldSettings
// ---------------------------------------------------------------------------

/// Petal field population.
///
/// The counts are fixed for the lifetime of the simulation — recycling
/// replaces petals in place, so these are exact at every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSettings {
    /// Sparse foreground petals.
    pub large_petals: usize,
    /// Dense background petals.
    pub small_petals: usize,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            large_petals: 8,
            small_petals: 45,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSettings
// ---------------------------------------------------------------------------

/// Settings for the voice-interaction challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Recognition language as a BCP-47 tag.
    pub language: String,
    /// Which recognizer to wire.
    pub recognizer: Capability,
    /// Seconds before a listening phase auto-advances when the recognizer
    /// capability is disabled.
    pub fallback_delay_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: "ja-JP".into(),
            recognizer: Capability::default(),
            fallback_delay_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// AnnouncementSettings
// ---------------------------------------------------------------------------

/// The fixed station announcement played by the listening challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementSettings {
    /// Utterance text.
    pub text: String,
    /// Synthesis language as a BCP-47 tag.
    pub language: String,
    /// Speaking rate multiplier.
    pub rate: f32,
    /// Voice pitch multiplier.
    pub pitch: f32,
    /// Which synthesizer to wire.
    pub synthesizer: Capability,
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            text: "まもなく、のぞみ二十七号、新大阪行きが、五番線に参ります。\
                   危ないですので、黄色い線の内側にお下がりください。"
                .into(),
            language: "ja-JP".into(),
            rate: 0.85,
            pitch: 1.05,
            synthesizer: Capability::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiSettings
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Initial window size in logical pixels.
    pub window_width: f32,
    pub window_height: f32,
    /// Last saved window position `(x, y)`.  `None` lets the window manager
    /// pick one on first launch.
    pub window_position: Option<(f32, f32)>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            window_width: 520.0,
            window_height: 760.0,
            window_position: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use sakura_stage::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Petal field population.
    pub field: FieldSettings,
    /// Voice-interaction settings.
    pub speech: SpeechSettings,
    /// Station announcement settings.
    pub announcement: AnnouncementSettings,
    /// Window settings.
    pub ui: UiSettings,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.field.large_petals, loaded.field.large_petals);
        assert_eq!(original.field.small_petals, loaded.field.small_petals);
        assert_eq!(original.speech.language, loaded.speech.language);
        assert_eq!(original.speech.recognizer, loaded.speech.recognizer);
        assert_eq!(
            original.speech.fallback_delay_secs,
            loaded.speech.fallback_delay_secs
        );
        assert_eq!(original.announcement.text, loaded.announcement.text);
        assert_eq!(original.announcement.rate, loaded.announcement.rate);
        assert_eq!(original.announcement.pitch, loaded.announcement.pitch);
        assert_eq!(original.ui.window_width, loaded.ui.window_width);
        assert_eq!(original.ui.window_position, loaded.ui.window_position);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");

        assert_eq!(config.field.large_petals, 8);
        assert_eq!(config.field.small_petals, 45);
        assert_eq!(config.speech.language, "ja-JP");
    }

    /// Verify default values match the widget's fixed tuning.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.field.large_petals, 8);
        assert_eq!(cfg.field.small_petals, 45);
        assert_eq!(cfg.speech.language, "ja-JP");
        assert_eq!(cfg.speech.recognizer, Capability::Simulated);
        assert_eq!(cfg.speech.fallback_delay_secs, 2);
        assert!(cfg.announcement.text.contains("のぞみ"));
        assert_eq!(cfg.announcement.language, "ja-JP");
        assert!((cfg.announcement.rate - 0.85).abs() < f32::EPSILON);
        assert!((cfg.announcement.pitch - 1.05).abs() < f32::EPSILON);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.field.large_petals = 3;
        cfg.field.small_petals = 90;
        cfg.speech.language = "en-US".into();
        cfg.speech.recognizer = Capability::Disabled;
        cfg.speech.fallback_delay_secs = 5;
        cfg.announcement.synthesizer = Capability::Disabled;
        cfg.ui.window_position = Some((120.0, 80.0));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.field.large_petals, 3);
        assert_eq!(loaded.field.small_petals, 90);
        assert_eq!(loaded.speech.language, "en-US");
        assert_eq!(loaded.speech.recognizer, Capability::Disabled);
        assert_eq!(loaded.speech.fallback_delay_secs, 5);
        assert_eq!(loaded.announcement.synthesizer, Capability::Disabled);
        assert_eq!(loaded.ui.window_position, Some((120.0, 80.0)));
    }
}
