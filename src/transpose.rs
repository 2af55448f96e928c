//! # Transposition Engine
//!
//! Moves chord markers from one key to another and re-spells the result for
//! the destination key.
//!
//! ## Algorithm
//! For every chord token:
//! 1. Parse the root, quality and optional flag
//! 2. Shift the root up by `delta = (to - from) mod 12`
//! 3. Spell the new root with [`display_spelling`] under the governing key
//! 4. Reattach the canonical quality suffix and the optional parentheses
//!
//! A marker may hold several tokens. Alternatives (`Bm|B7`) and slash chords
//! (`D/F#`) are split and each token is transposed on its own. A token whose root
//! is not a known key becomes [`UNKNOWN_CHORD`] so the line keeps its shape.
//! Parentheses around a whole compound marker (`(D/F#)`) are kept around the
//! transposed result.
//!
//! The destination key governs every token, bass notes included: `D/F#` moved
//! from G to E is written `B/D#`.
//!
//! ## Example
//! ```rust
//! use songsheet::key::resolve_key;
//! use songsheet::transpose::Transposer;
//!
//! let g = resolve_key("G").unwrap();
//! let e = resolve_key("E").unwrap();
//! let transposer = Transposer::new(g, e);
//! assert_eq!(transposer.transpose_chord("Em7").unwrap(), "C#m7");
//! assert_eq!(transposer.transpose_chord("D/F#").unwrap(), "B/D#");
//! ```

use crate::ast::{Line, Section, Song};
use crate::chord::{parse_chord, strip_optional_group, ALTERNATIVE_SEPARATOR, BASS_SEPARATOR};
use crate::error::Result;
use crate::key::{display_spelling, PitchClass};


/// Written in place of a chord whose root is not a known key.
pub const UNKNOWN_CHORD: &str = "?";

/// A fixed move between two keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transposer {
    governing: PitchClass,
    delta: u8,
}

impl Transposer {
    /// Transpose from `from` to `to`, spelling for `to`.
    pub fn new(from: PitchClass, to: PitchClass) -> Self {
        Self {
            governing: to,
            delta: from.interval_to(to),
        }
    }

    /// Spell results for a key other than the destination.
    pub fn with_governing(mut self, governing: PitchClass) -> Self {
        self.governing = governing;
        self
    }

    /// Semitones moved upward, 0..12.
    pub fn delta(&self) -> u8 {
        self.delta
    }

    /// Transpose the text of one marker, e.g. `D/F#` or `Bm|B7`.
    pub fn transpose_chord(&self, text: &str) -> Result<String> {
        if let Some(inner) = strip_optional_group(text.trim()) {
            return Ok(format!("({})", self.transpose_parts(inner)?));
        }
        self.transpose_parts(text)
    }

    fn transpose_parts(&self, text: &str) -> Result<String> {
        let alternatives = text
            .split(ALTERNATIVE_SEPARATOR)
            .map(|alternative| {
                let parts = alternative
                    .split(BASS_SEPARATOR)
                    .map(|part| self.transpose_token(part))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(BASS_SEPARATOR.to_string().as_str()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(alternatives.join(ALTERNATIVE_SEPARATOR.to_string().as_str()))
    }

    fn transpose_token(&self, text: &str) -> Result<String> {
        let chord = parse_chord(text.trim());
        let root = match chord.root {
            Some(root) => root,
            None => {
                log::warn!("Unrecognized chord {:?}; writing {}", text, UNKNOWN_CHORD);
                return Ok(UNKNOWN_CHORD.to_string());
            }
        };
        let name = display_spelling(root.shift(self.delta), self.governing)?;
        Ok(chord.render(name))
    }

    pub fn transpose_line(&self, line: &Line) -> Result<Line> {
        if !line.has_chords() {
            return Ok(line.clone());
        }
        line.map_chords(|marker| self.transpose_chord(&marker.chord))
    }
}

/// Transpose one marker's chord text from `from` to `to`, spelling for `governing`.
pub fn transpose(
    text: &str,
    from: PitchClass,
    to: PitchClass,
    governing: PitchClass,
) -> Result<String> {
    Transposer::new(from, to)
        .with_governing(governing)
        .transpose_chord(text)
}

/// Rewrite a chord with canonical suffixes and spelled for `key`, without moving it.
pub fn canonical_form(text: &str, key: PitchClass) -> Result<String> {
    transpose(text, key, key, key)
}

/// Transpose every marker of a line. Lyric text is left untouched.
pub fn transpose_line(line: &Line, transposer: &Transposer) -> Result<Line> {
    transposer.transpose_line(line)
}

/// Transpose a song from its main key to `target`.
///
/// - A song without a main key is returned unchanged
/// - `None` as the target keeps the main key, which still rewrites every chord
///   in canonical form
pub fn transpose_song(song: &Song, target: Option<PitchClass>) -> Result<Song> {
    let from = match song.main_key {
        Some(key) => key,
        None => {
            log::debug!("Song has no main key; leaving chords as written");
            return Ok(song.clone());
        }
    };
    transpose_song_between(song, from, target.unwrap_or(from))
}

/// Transpose a song between two explicit keys. The result's main key is `to`.
pub fn transpose_song_between(song: &Song, from: PitchClass, to: PitchClass) -> Result<Song> {
    let transposer = Transposer::new(from, to);
    log::debug!(
        "Transposing song from {} to {} ({} semitones)",
        from,
        to,
        transposer.delta()
    );

    let sections = song
        .sections
        .iter()
        .map(|section| {
            let lines = section
                .lines
                .iter()
                .map(|line| transposer.transpose_line(line))
                .collect::<Result<Vec<_>>>()?;
            Ok(Section {
                title: section.title.clone(),
                lines,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Song {
        metadata: song.metadata.clone(),
        main_key: Some(to),
        sections,
    })
}
