//! crates/dyslexia_core/src/settings.rs
//!
//! Per-user display and audio preferences, and the explicit field-by-field
//! merge used when a client sends a partial update.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTheme {
    Light,
    Dark,
    System,
}

impl ColorTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTheme::Light => "light",
            ColorTheme::Dark => "dark",
            ColorTheme::System => "system",
        }
    }
}

impl FromStr for ColorTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ColorTheme::Light),
            "dark" => Ok(ColorTheme::Dark),
            "system" => Ok(ColorTheme::System),
            other => Err(format!("unknown color theme '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub line_spacing: f64,
    pub theme: ColorTheme,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            font_family: "Open Sans".to_string(),
            font_size: 16.0,
            letter_spacing: 1.0,
            line_spacing: 1.8,
            theme: ColorTheme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub voice: String,
    pub speech_rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            voice: "vi-VN-Standard-A".to_string(),
            speech_rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// The single settings row stored per user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserSettings {
    pub display: DisplaySettings,
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayPatch {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_spacing: Option<f64>,
    pub theme: Option<ColorTheme>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioPatch {
    pub voice: Option<String>,
    pub speech_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub display: DisplayPatch,
    pub audio: AudioPatch,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be a positive number")]
    NotPositive(&'static str),
    #[error("volume must be between 0 and 1")]
    VolumeOutOfRange,
}

fn positive(name: &'static str, value: Option<f64>) -> Result<(), SettingsError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(SettingsError::NotPositive(name)),
        _ => Ok(()),
    }
}

fn non_empty(name: &'static str, value: &Option<String>) -> Result<(), SettingsError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(SettingsError::Empty(name)),
        _ => Ok(()),
    }
}

impl DisplayPatch {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_empty("fontFamily", &self.font_family)?;
        positive("fontSize", self.font_size)?;
        positive("letterSpacing", self.letter_spacing)?;
        positive("lineSpacing", self.line_spacing)
    }
}

impl AudioPatch {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_empty("voice", &self.voice)?;
        positive("speechRate", self.speech_rate)?;
        positive("pitch", self.pitch)?;
        match self.volume {
            Some(v) if !(0.0..=1.0).contains(&v) => Err(SettingsError::VolumeOutOfRange),
            _ => Ok(()),
        }
    }
}

impl SettingsPatch {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.display.validate()?;
        self.audio.validate()
    }
}

impl DisplaySettings {
    pub fn merge(&mut self, patch: DisplayPatch) {
        if let Some(v) = patch.font_family {
            self.font_family = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
        if let Some(v) = patch.letter_spacing {
            self.letter_spacing = v;
        }
        if let Some(v) = patch.line_spacing {
            self.line_spacing = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
    }
}

impl AudioSettings {
    pub fn merge(&mut self, patch: AudioPatch) {
        if let Some(v) = patch.voice {
            self.voice = v;
        }
        if let Some(v) = patch.speech_rate {
            self.speech_rate = v;
        }
        if let Some(v) = patch.pitch {
            self.pitch = v;
        }
        if let Some(v) = patch.volume {
            self.volume = v;
        }
    }
}

impl UserSettings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        self.display.merge(patch.display);
        self.audio.merge(patch.audio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut settings = UserSettings::default();
        settings.merge(SettingsPatch {
            display: DisplayPatch { font_size: Some(22.0), theme: Some(ColorTheme::Dark), ..Default::default() },
            audio: AudioPatch { speech_rate: Some(0.8), ..Default::default() },
        });

        assert_eq!(settings.display.font_size, 22.0);
        assert_eq!(settings.display.theme, ColorTheme::Dark);
        assert_eq!(settings.display.font_family, "Open Sans");
        assert_eq!(settings.audio.speech_rate, 0.8);
        assert_eq!(settings.audio.voice, "vi-VN-Standard-A");
    }

    #[test]
    fn validation_rejects_bad_numbers() {
        let patch = SettingsPatch {
            display: DisplayPatch { font_size: Some(0.0), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(patch.validate(), Err(SettingsError::NotPositive("fontSize")));

        let patch = SettingsPatch {
            audio: AudioPatch { volume: Some(1.5), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(patch.validate(), Err(SettingsError::VolumeOutOfRange));

        let patch = SettingsPatch {
            audio: AudioPatch { volume: Some(0.0), voice: Some("en-US".into()), ..Default::default() },
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
