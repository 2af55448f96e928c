//! Render options, usually read from a small YAML file:
//!
//! ```yaml
//! target-key: Bb
//! chord-prefix: "<b>"
//! chord-suffix: "</b>"
//! pad-chords: true
//! ```
//!
//! Every key is optional.

use crate::error::{Result, SongError};
use crate::key::{resolve_key, PitchClass};
use crate::layout::Wrapper;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RenderOptions {
    /// Key to transpose to. `None` keeps the song's main key.
    pub target_key: Option<String>,
    /// Written before each chord in the chord overlay view.
    pub chord_prefix: String,
    /// Written after each chord in the chord overlay view.
    pub chord_suffix: String,
    /// Insert padding so chords do not overlap.
    pub pad_chords: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            target_key: None,
            chord_prefix: "{".to_string(),
            chord_suffix: "}".to_string(),
            pad_chords: true,
        }
    }
}

impl RenderOptions {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| SongError::OptionsError(e.to_string()))
    }

    pub fn with_target_key(mut self, key: impl Into<String>) -> Self {
        self.target_key = Some(key.into());
        self
    }

    /// Resolve the requested target key.
    ///
    /// # Errors
    /// [`SongError::KeyError`] when a key was requested but is not a known key name.
    pub fn target(&self) -> Result<Option<PitchClass>> {
        match self.target_key.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => resolve_key(name)
                .map(Some)
                .ok_or_else(|| SongError::KeyError(name.to_string())),
        }
    }

    pub fn wrapper(&self) -> Wrapper {
        Wrapper::new(self.chord_prefix.as_str(), self.chord_suffix.as_str())
    }
}
