//! # Song Model
//!
//! The structured form of a song document.
//!
//! ## Type Hierarchy
//! ```text
//! Song
//!   ├── Metadata (insertion-ordered name → value, last write wins)
//!   ├── main_key: Option<PitchClass>
//!   └── Vec<Section>
//!         ├── title (empty for the implicit leading section)
//!         └── Vec<Line>
//!               ├── text   "{G}Amazing {C}grace"
//!               └── Vec<Marker>
//!                     ├── chord  "G"
//!                     └── span   0..3 (byte range of "{G}" in text)
//! ```
//!
//! Every value here is immutable once built. Transposition and layout produce
//! new `Line`s and `Song`s, so the parsed original is always available for
//! another transposition.

use crate::error::Result;
use crate::key::PitchClass;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::ops::Range;

pub const MARKER_OPEN: char = '{';
pub const MARKER_CLOSE: char = '}';

/// Song header values keyed by normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing (in place) any earlier value under the same name.
    /// Returns the replaced value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Entries in the order their names first appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An inline `{chord}` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Chord text between the braces, trimmed.
    pub chord: String,
    /// Byte range of the whole marker, braces included, within [`Line::text`].
    pub span: Range<usize>,
}

/// A piece of a line: plain text or a marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker(&'a Marker),
}

/// One lyric line with its chord markers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Line {
    pub text: String,
    pub markers: Vec<Marker>,
}

impl Line {
    /// Walk the line as alternating text and marker segments.
    ///
    /// Empty text segments are skipped.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.markers.len() * 2 + 1);
        let mut cursor = 0;
        for marker in &self.markers {
            if marker.span.start > cursor {
                segments.push(Segment::Text(&self.text[cursor..marker.span.start]));
            }
            segments.push(Segment::Marker(marker));
            cursor = marker.span.end;
        }
        if cursor < self.text.len() {
            segments.push(Segment::Text(&self.text[cursor..]));
        }
        segments
    }

    /// Build a line from segments, writing each chord as `{chord}`.
    pub fn from_parts<'a, I>(parts: I) -> Line
    where
        I: IntoIterator<Item = Part<'a>>,
    {
        let mut line = Line::default();
        for part in parts {
            match part {
                Part::Text(text) => line.text.push_str(text),
                Part::Chord(chord) => {
                    let start = line.text.len();
                    line.text.push(MARKER_OPEN);
                    line.text.push_str(&chord);
                    line.text.push(MARKER_CLOSE);
                    line.markers.push(Marker {
                        chord,
                        span: start..line.text.len(),
                    });
                }
            }
        }
        line
    }

    /// Produce a new line with every chord replaced by `f(marker)`.
    ///
    /// Plain text is kept byte for byte; marker spans are recomputed.
    pub fn map_chords<F>(&self, mut f: F) -> Result<Line>
    where
        F: FnMut(&Marker) -> Result<String>,
    {
        let mut parts = Vec::with_capacity(self.markers.len() * 2 + 1);
        for segment in self.segments() {
            match segment {
                Segment::Text(text) => parts.push(Part::Text(text)),
                Segment::Marker(marker) => parts.push(Part::Chord(f(marker)?)),
            }
        }
        Ok(Line::from_parts(parts))
    }

    pub fn has_chords(&self) -> bool {
        !self.markers.is_empty()
    }
}

/// Input to [`Line::from_parts`].
#[derive(Debug, Clone, PartialEq)]
pub enum Part<'a> {
    Text(&'a str),
    Chord(String),
}

/// A titled group of lines (`[Verse 1]`, `[Chorus]`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Section {
    pub title: String,
    pub lines: Vec<Line>,
}

/// A parsed song document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub metadata: Metadata,
    pub main_key: Option<PitchClass>,
    pub sections: Vec<Section>,
}

impl Song {
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title")
    }

    /// `author`, falling back to `authors`.
    pub fn author(&self) -> Option<&str> {
        self.metadata
            .get("author")
            .filter(|a| !a.is_empty())
            .or_else(|| self.metadata.get("authors"))
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.sections.iter().flat_map(|s| s.lines.iter())
    }
}
