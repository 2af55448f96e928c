//! # Song Text Parser
//!
//! Turns a raw song document into a [`Song`].
//!
//! ## Document Format
//! ```text
//! Title: Amazing Grace          ┐
//! Author: John Newton           │ header: "Name: Value" lines
//! Key: G                        ┘
//! ==========                      delimiter: a run of five or more '='
//! [Verse 1]                       section header
//! {G}Amazing {G7}grace, how {C}sweet the {G}sound
//! ```
//!
//! ## State Machine
//! The parser walks the document line by line in one of two states:
//!
//! ### Header
//! - Lines without a colon are ignored
//! - `Name: Value` splits on the first colon; the name is trimmed, lowercased and
//!   has spaces replaced with underscores (`Main Key` → `main_key`); the value is
//!   trimmed. A repeated name overwrites the earlier value.
//! - The delimiter line switches to the body and is not stored
//!
//! ### Body
//! - Blank lines are skipped (they do not separate sections)
//! - `[Title]` starts a new section
//! - Content before any section header goes into an untitled section
//! - Every other line is trimmed and has its `{chord}` markers extracted
//!
//! A document without any delimiter line is all body.
//!
//! ## Main Key
//! `key` (or `main_key` when `key` is absent) is resolved through the key model.
//! A value that cannot be resolved leaves the song without a main key, which
//! makes song transposition a no-op.
//!
//! ## Example
//! ```rust
//! use songsheet::parse_song;
//!
//! let song = parse_song("Title: Amazing\nKey: G\n=====\n[Verse]\n{G}Hello {C}world");
//! assert_eq!(song.title(), Some("Amazing"));
//! assert_eq!(song.main_key.map(|k| k.name()), Some("G"));
//! assert_eq!(song.sections[0].title, "Verse");
//! assert_eq!(song.sections[0].lines[0].markers.len(), 2);
//! ```

use crate::ast::{Line, Metadata, Part, Section, Song, MARKER_CLOSE, MARKER_OPEN};
use crate::chord::parse_chord;
use crate::key::{resolve_key, PitchClass};

/// Minimum run of `=` that separates header from body.
pub const HEADER_DELIMITER_RUN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsingState {
    Header,
    Body,
}

/// True when `line` contains a run of at least five `=` characters.
pub fn is_header_delimiter(line: &str) -> bool {
    let mut run = 0;
    for c in line.chars() {
        if c == '=' {
            run += 1;
            if run >= HEADER_DELIMITER_RUN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Split a header line into a normalized name and a trimmed value.
///
/// Returns `None` for lines without a colon or with an empty name.
pub fn parse_metadata_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim().to_lowercase().replace(' ', "_");
    if name.is_empty() {
        log::warn!("Ignoring metadata line without a name: {:?}", line);
        return None;
    }
    Some((name, value.trim().to_string()))
}

/// Extract `{chord}` markers from one body line.
///
/// Whitespace inside a marker is trimmed (`{ Am }` becomes `{Am}`). An opening
/// brace with no closing brace after it is kept as literal text.
pub fn parse_line(text: &str) -> Line {
    let mut parts = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(MARKER_OPEN) {
        let inside = &rest[open + MARKER_OPEN.len_utf8()..];
        let close = match inside.find(MARKER_CLOSE) {
            Some(close) => close,
            None => break,
        };
        if open > 0 {
            parts.push(Part::Text(&rest[..open]));
        }
        parts.push(Part::Chord(inside[..close].trim().to_string()));
        rest = &inside[close + MARKER_CLOSE.len_utf8()..];
    }
    if !rest.is_empty() {
        parts.push(Part::Text(rest));
    }

    Line::from_parts(parts)
}

/// Resolve a main key value such as `G`, `Bb` or `F#m`.
///
/// Minor keys resolve to their root so `Am` governs like `A`.
pub fn resolve_main_key(value: &str) -> Option<PitchClass> {
    resolve_key(value).or_else(|| {
        let chord = parse_chord(value);
        if chord.is_optional {
            return None;
        }
        chord.root
    })
}

struct SongBuilder {
    metadata: Metadata,
    sections: Vec<Section>,
}

impl SongBuilder {
    fn new() -> Self {
        Self {
            metadata: Metadata::new(),
            sections: Vec::new(),
        }
    }

    fn add_metadata(&mut self, line: &str) {
        if let Some((name, value)) = parse_metadata_line(line) {
            self.metadata.insert(name, value);
        }
    }

    fn add_body_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(title) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            self.sections.push(Section {
                title: title.to_string(),
                lines: Vec::new(),
            });
            return;
        }

        if self.sections.is_empty() {
            self.sections.push(Section::default());
        }
        if let Some(section) = self.sections.last_mut() {
            section.lines.push(parse_line(trimmed));
        }
    }

    fn finish(self) -> Song {
        let key_value = self
            .metadata
            .get("key")
            .filter(|v| !v.is_empty())
            .or_else(|| self.metadata.get("main_key"));

        let main_key = key_value.and_then(|value| {
            let key = resolve_main_key(value);
            if key.is_none() {
                log::warn!("Unrecognized main key {:?}; song will not be transposed", value);
            }
            key
        });

        Song {
            metadata: self.metadata,
            main_key,
            sections: self.sections,
        }
    }
}

fn parse_document(source: &str, metadata_only: bool) -> Song {
    let mut builder = SongBuilder::new();
    let mut state = if source.lines().any(is_header_delimiter) {
        ParsingState::Header
    } else {
        log::debug!("No header delimiter found; parsing whole document as body");
        ParsingState::Body
    };

    for line in source.lines() {
        match state {
            ParsingState::Header => {
                if is_header_delimiter(line) {
                    state = ParsingState::Body;
                    if metadata_only {
                        break;
                    }
                } else if line.contains(':') {
                    builder.add_metadata(line);
                }
            }
            ParsingState::Body => {
                if metadata_only {
                    break;
                }
                builder.add_body_line(line);
            }
        }
    }

    let song = builder.finish();
    log::debug!(
        "Parsed song with {} metadata entries and {} sections",
        song.metadata.len(),
        song.sections.len()
    );
    song
}

/// Parse a complete song document.
///
/// Parsing never fails; malformed pieces degrade as described in the module
/// documentation.
pub fn parse_song(source: &str) -> Song {
    parse_document(source, false)
}

/// Parse only the header of a song document (no sections).
///
/// Useful for building song listings without paying for the body.
pub fn parse_metadata(source: &str) -> Song {
    parse_document(source, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_body() {
        let source = "Title: Amazing\nKey: G\n=====\n[Verse]\n{G}Hello {C}world";
        let song = parse_song(source);
        assert_eq!(song.metadata.get("title"), Some("Amazing"));
        assert_eq!(song.metadata.get("key"), Some("G"));
        assert_eq!(song.main_key, resolve_key("G"));
        assert_eq!(song.sections.len(), 1);
        assert_eq!(song.sections[0].title, "Verse");

        let line = &song.sections[0].lines[0];
        assert_eq!(line.text, "{G}Hello {C}world");
        assert_eq!(line.markers.len(), 2);
        assert_eq!(line.markers[1].chord, "C");
        assert_eq!(line.markers[1].span, 9..12);
    }

    #[test]
    fn test_without_delimiter_everything_is_body() {
        let song = parse_song("Title: Not metadata\n{A}Line");
        assert!(song.metadata.is_empty());
        assert_eq!(song.main_key, None);
        assert_eq!(song.sections.len(), 1);
        assert_eq!(song.sections[0].title, "");
        assert_eq!(song.sections[0].lines[0].text, "Title: Not metadata");
        assert_eq!(song.sections[0].lines[1].text, "{A}Line");
    }

    #[test]
    fn test_metadata_normalization() {
        let source = "Title : First\nMain Key: Bb\nnot metadata\nTITLE: Second\nSource 1: Hymnal: 1779\n==========\n";
        let song = parse_song(source);
        assert_eq!(song.metadata.get("title"), Some("Second"));
        assert_eq!(song.metadata.get("main_key"), Some("Bb"));
        assert_eq!(song.metadata.get("source_1"), Some("Hymnal: 1779"));
        assert_eq!(song.metadata.len(), 3);
        assert_eq!(song.main_key, resolve_key("B♭"));
        assert!(song.sections.is_empty());
    }

    #[test]
    fn test_key_takes_precedence_over_main_key() {
        let song = parse_song("Main Key: D\nKey: E\n=====\n");
        assert_eq!(song.main_key, resolve_key("E"));
    }

    #[test]
    fn test_minor_and_unknown_main_keys() {
        assert_eq!(parse_song("Key: F#m\n=====").main_key, resolve_key("F#"));
        assert_eq!(parse_song("Key: H\n=====").main_key, None);
        assert_eq!(parse_song("Key:\n=====").main_key, None);
    }

    #[test]
    fn test_blank_lines_and_sections() {
        let source = "=====\n\nIntro line\n\n[Verse 1]\n  {D}First  \n\n{A}Second\n[Chorus]\n\n{G}Third\r\n[Empty]";
        let song = parse_song(source);
        let titles: Vec<&str> = song.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["", "Verse 1", "Chorus", "Empty"]);
        assert_eq!(song.sections[0].lines.len(), 1);
        assert_eq!(song.sections[1].lines.len(), 2);
        assert_eq!(song.sections[1].lines[0].text, "{D}First");
        assert_eq!(song.sections[2].lines[0].text, "{G}Third");
        assert!(song.sections[3].lines.is_empty());
    }

    #[test]
    fn test_marker_whitespace_is_trimmed() {
        let line = parse_line("{ Am }Amazing { C / G }grace");
        assert_eq!(line.text, "{Am}Amazing {C / G}grace");
        assert_eq!(line.markers[0].chord, "Am");
        assert_eq!(line.markers[1].chord, "C / G");
    }

    #[test]
    fn test_unbalanced_braces_are_literal() {
        let line = parse_line("{G}Hello {world");
        assert_eq!(line.text, "{G}Hello {world");
        assert_eq!(line.markers.len(), 1);

        let line = parse_line("Hello} {C}there");
        assert_eq!(line.markers.len(), 1);
        assert_eq!(line.markers[0].chord, "C");
        assert_eq!(line.markers[0].span, 7..10);
    }

    #[test]
    fn test_marker_offsets_with_multibyte_text() {
        let line = parse_line("Gloria in excélsis {D♭}De{A♭}o");
        for marker in &line.markers {
            let raw = &line.text[marker.span.clone()];
            assert_eq!(raw, format!("{{{}}}", marker.chord));
        }
    }

    #[test]
    fn test_is_header_delimiter() {
        assert!(is_header_delimiter("====="));
        assert!(is_header_delimiter("  ==========  "));
        assert!(!is_header_delimiter("===="));
        assert!(!is_header_delimiter("== == == =="));
    }

    #[test]
    fn test_parse_metadata_skips_body() {
        let song = parse_metadata("Title: Amazing\n=====\n[Verse]\n{G}Hello");
        assert_eq!(song.title(), Some("Amazing"));
        assert!(song.sections.is_empty());
    }
}
