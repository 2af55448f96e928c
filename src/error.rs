//! # Error Types
//!
//! This module defines the error type shared by every stage of song processing.
//!
//! Most malformed input is *not* an error here: an unknown chord root becomes the
//! `?` sentinel, an unknown main key leaves the song untransposed, and a missing
//! header delimiter just means the whole document is body text. What remains are
//! the cases a caller has to act on.
//!
//! ## Error Types
//! - `SpellingError` - The static spelling table produced an impossible candidate set
//! - `KeyError` - A key explicitly requested by the caller could not be resolved
//! - `OptionsError` - Render options could not be deserialized
//!
//! ## Usage
//! ```rust
//! use songsheet::{render_song, RenderOptions, SongError};
//!
//! let options = RenderOptions { target_key: Some("H".to_string()), ..Default::default() };
//! match render_song("{C}Hello", &options) {
//!     Err(SongError::KeyError(key)) => eprintln!("No such key: {}", key),
//!     Err(e) => eprintln!("Error: {}", e),
//!     Ok(song) => println!("{} sections", song.sections.len()),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SongError {
    /// Internal consistency fault in the spelling table.
    ///
    /// Filtering the spellings of `pitch_class` by the governing key's accidental
    /// preference left a number of candidates other than one or two. This is a
    /// programming error in the table, never a property of the input document.
    ///
    /// # Example
    /// ```
    /// # use songsheet::SongError;
    /// let err = SongError::SpellingError {
    ///     pitch_class: 5,
    ///     governing: 4,
    ///     candidates: 0,
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Spelling table inconsistency: pitch class 5 under key 4 has 0 candidate spellings"
    /// );
    /// ```
    #[error("Spelling table inconsistency: pitch class {pitch_class} under key {governing} has {candidates} candidate spellings")]
    SpellingError {
        pitch_class: u8,
        governing: u8,
        candidates: usize,
    },

    /// A key name supplied by the caller (not read from a document) is unknown.
    ///
    /// # Example
    /// ```
    /// # use songsheet::SongError;
    /// let err = SongError::KeyError("H".to_string());
    /// assert_eq!(err.to_string(), "Unknown key: H");
    /// ```
    #[error("Unknown key: {0}")]
    KeyError(String),

    /// Render options could not be read.
    #[error("Invalid options: {0}")]
    OptionsError(String),
}

pub type Result<T> = std::result::Result<T, SongError>;
