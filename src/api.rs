//! # Public API
//!
//! One-call entry points from document text to display-ready output.
//!
//! ## Functions
//! - [`render_song()`] - Parse, transpose and lay out a whole document
//! - [`render()`] - Same, for an already parsed [`Song`]
//! - [`summarize_song()`] - Header information only, for song listings
//!
//! ## Typical Usage
//! ```rust
//! use songsheet::{render_song, RenderOptions};
//!
//! let source = "Title: Amazing\nKey: G\n=====\n[Verse]\n{G}Hello {C}world";
//! let options = RenderOptions::default().with_target_key("A");
//!
//! let song = render_song(source, &options)?;
//! let line = &song.sections[0].lines[0];
//! assert_eq!(line.raw, "{A}Hello {D}world");
//! assert_eq!(line.lyrics, "Hello world");
//! # Ok::<(), songsheet::SongError>(())
//! ```

use crate::ast::{Line, Metadata, Song};
use crate::error::Result;
use crate::key::PitchClass;
use crate::layout::{self, ChordWrapper, StackedLine};
use crate::options::RenderOptions;
use crate::parser::{parse_metadata, parse_song};
use crate::transpose::transpose_song;
use serde::Serialize;

/// Every view of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLine {
    /// Markers as written, no padding.
    pub raw: String,
    /// Chord overlay, padded when requested.
    pub chorded: String,
    /// Lyric text only, no padding.
    pub lyrics: String,
    pub stacked: StackedLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    pub title: String,
    pub lines: Vec<RenderedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSong {
    pub metadata: Metadata,
    /// Main key from the document header.
    pub original_key: Option<PitchClass>,
    /// Key the chords are written in after transposition.
    pub main_key: Option<PitchClass>,
    pub sections: Vec<RenderedSection>,
}

/// Header information for a song listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub title: Option<String>,
    pub author: Option<String>,
    pub main_key: Option<PitchClass>,
    pub metadata: Metadata,
}

fn render_line<W: ChordWrapper + ?Sized>(line: &Line, wrapper: &W, pad: bool) -> RenderedLine {
    RenderedLine {
        raw: layout::raw(line),
        chorded: layout::chorded(line, wrapper, pad),
        lyrics: layout::lyrics(line),
        stacked: layout::stacked(line),
    }
}

/// Transpose and lay out a parsed song.
///
/// # Errors
/// - [`SongError::KeyError`](crate::SongError::KeyError) if `options` names an unknown target key
/// - [`SongError::SpellingError`](crate::SongError::SpellingError) on a spelling table fault
pub fn render(song: &Song, options: &RenderOptions) -> Result<RenderedSong> {
    let target = options.target()?;
    let transposed = transpose_song(song, target)?;
    let wrapper = options.wrapper();

    let sections = transposed
        .sections
        .iter()
        .map(|section| RenderedSection {
            title: section.title.clone(),
            lines: section
                .lines
                .iter()
                .map(|line| render_line(line, &wrapper, options.pad_chords))
                .collect(),
        })
        .collect();

    Ok(RenderedSong {
        metadata: transposed.metadata,
        original_key: song.main_key,
        main_key: transposed.main_key,
        sections,
    })
}

/// Parse, transpose and lay out a song document.
///
/// The target key is checked before the document is parsed, so an unknown key
/// is reported even for an empty document.
pub fn render_song(source: &str, options: &RenderOptions) -> Result<RenderedSong> {
    options.target()?;
    render(&parse_song(source), options)
}

/// Read the header of a document for a song listing.
pub fn summarize_song(source: &str) -> SongSummary {
    let song = parse_metadata(source);
    SongSummary {
        title: song.title().map(str::to_string),
        author: song.author().map(str::to_string),
        main_key: song.main_key,
        metadata: song.metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::resolve_key;
    use crate::SongError;

    const AMAZING: &str = "Title: Amazing\nKey: G\n=====\n[Verse]\n{G}Hello {C}world";

    #[test]
    fn test_render_song_to_target_key() {
        let options = RenderOptions::default().with_target_key("A");
        let song = render_song(AMAZING, &options).unwrap();

        assert_eq!(song.original_key, resolve_key("G"));
        assert_eq!(song.main_key, resolve_key("A"));
        assert_eq!(song.sections[0].title, "Verse");

        let line = &song.sections[0].lines[0];
        assert_eq!(line.raw, "{A}Hello {D}world");
        assert_eq!(line.chorded, "{A}Hello {D}world");
        assert_eq!(line.lyrics, "Hello world");
        assert_eq!(line.stacked.chords, "A     D");
    }

    #[test]
    fn test_render_song_without_target_keeps_key() {
        let song = render_song(AMAZING, &RenderOptions::default()).unwrap();
        assert_eq!(song.main_key, resolve_key("G"));
        assert_eq!(song.sections[0].lines[0].raw, "{G}Hello {C}world");
    }

    #[test]
    fn test_padding_only_affects_chorded_view() {
        let source = "Key: E\n=====\n{E}I {B}love";
        let options = RenderOptions {
            chord_prefix: "[".to_string(),
            chord_suffix: "]".to_string(),
            ..RenderOptions::default()
        }
        .with_target_key("F");
        let song = render_song(source, &options).unwrap();
        let line = &song.sections[0].lines[0];
        assert_eq!(line.raw, "{F}I {C}love");
        assert_eq!(line.chorded, "[F]I [C]love");
        assert_eq!(line.lyrics, "I love");

        let source = "Key: G\n=====\n{Em7}I {C}love";
        let song = render_song(source, &options).unwrap();
        let line = &song.sections[0].lines[0];
        assert_eq!(line.raw, "{Dm7}I {B♭}love");
        assert_eq!(line.chorded, "[Dm7]I  [B♭]love");
        assert_eq!(line.lyrics, "I love");

        let unpadded = RenderOptions {
            pad_chords: false,
            ..options
        };
        let song = render_song(source, &unpadded).unwrap();
        assert_eq!(song.sections[0].lines[0].chorded, "[Dm7]I [B♭]love");
    }

    #[test]
    fn test_unknown_target_key_is_an_error() {
        let options = RenderOptions::default().with_target_key("H");
        let result = render_song(AMAZING, &options);
        assert_eq!(result.unwrap_err(), SongError::KeyError("H".to_string()));
    }

    #[test]
    fn test_song_without_main_key_ignores_target() {
        let options = RenderOptions::default().with_target_key("A");
        let song = render_song("Title: Loose\n=====\n{G}Hi", &options).unwrap();
        assert_eq!(song.main_key, None);
        assert_eq!(song.sections[0].lines[0].raw, "{G}Hi");
    }

    #[test]
    fn test_summarize_song() {
        let summary = summarize_song("Title: Amazing\nAuthors: Newton\nMain Key: Bb\n=====\n{B♭}Hi");
        assert_eq!(summary.title.as_deref(), Some("Amazing"));
        assert_eq!(summary.author.as_deref(), Some("Newton"));
        assert_eq!(summary.main_key, resolve_key("Bb"));
        assert_eq!(summary.metadata.len(), 3);
    }
}
