//! # Layout Formatter
//!
//! Renders a [`Line`] into the views a reader sees, keeping each chord over the
//! syllable it annotates.
//!
//! ## Padding
//! When chords are drawn above the lyric, a chord that is wider than the lyric
//! text before the next marker would run into the next chord. Padding widens
//! the lyric instead:
//!
//! ```text
//! {C#m7}I {A}love          before: "C#m7" needs 4 columns, "I " gives 2
//! {C#m7}I   {A}love        after:  2 spaces inserted after the last space
//! ```
//!
//! The scan walks the line once, left to right:
//! - after a marker, the next gap must cover the display width of its chord
//! - each lyric character absorbs its own display width
//! - whitespace remembers where the current word starts
//! - at the next marker any uncovered width is inserted as spaces at the start
//!   of the current word (or right before the marker when the gap has no
//!   whitespace), so words are never split
//!
//! Insertions are applied right to left so earlier offsets stay valid. Padding
//! never changes the number or order of markers, and never changes the lyric
//! words themselves.
//!
//! ## Views
//! - **raw**: the line text with markers as written
//! - **lyrics**: markers removed
//! - **chorded**: the padded line with every marker rewritten by a
//!   [`ChordWrapper`] (`<b>C</b>`, `[C]`, ...)
//! - **stacked**: a chord line above the lyric line, padded with one extra
//!   column per chord so neighbouring chords never touch

use crate::ast::{Line, Marker, Segment};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Spaces to insert at a byte offset of a line's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub index: usize,
    pub spaces: usize,
}

/// Formats the chord text of a marker for the chord overlay view.
pub trait ChordWrapper {
    fn wrap(&self, chord: &str) -> String;
}

impl<F> ChordWrapper for F
where
    F: Fn(&str) -> String,
{
    fn wrap(&self, chord: &str) -> String {
        self(chord)
    }
}

/// Surround each chord with fixed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    pub prefix: String,
    pub suffix: String,
}

impl Wrapper {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl ChordWrapper for Wrapper {
    fn wrap(&self, chord: &str) -> String {
        format!("{}{}{}", self.prefix, chord, self.suffix)
    }
}

/// Find where spaces must be inserted so no chord overruns the next one.
///
/// Offsets are byte offsets into `line.text`, in ascending order.
pub fn padding_insertions(line: &Line) -> Vec<Insertion> {
    spaced_insertions(line, 0)
}

/// Like [`padding_insertions`], reserving `spacing` extra columns after each chord.
fn spaced_insertions(line: &Line, spacing: usize) -> Vec<Insertion> {
    let mut insertions = Vec::new();
    let mut still_needed: usize = 0;
    let mut word_start: Option<usize> = None;
    let mut cursor = 0;

    for marker in &line.markers {
        let gap = &line.text[cursor..marker.span.start];
        for (offset, c) in gap.char_indices() {
            if c.is_whitespace() {
                word_start = Some(cursor + offset + c.len_utf8());
            }
            still_needed = still_needed.saturating_sub(c.width().unwrap_or(0));
        }

        if still_needed > 0 {
            insertions.push(Insertion {
                index: word_start.unwrap_or(marker.span.start),
                spaces: still_needed,
            });
        }

        word_start = None;
        still_needed = marker.chord.width() + spacing;
        cursor = marker.span.end;
    }

    insertions
}

/// Apply padding to a line, shifting marker spans to match.
pub fn pad_line(line: &Line) -> Line {
    apply_insertions(line, &padding_insertions(line))
}

fn apply_insertions(line: &Line, insertions: &[Insertion]) -> Line {
    if insertions.is_empty() {
        return line.clone();
    }

    let mut text = line.text.clone();
    for insertion in insertions.iter().rev() {
        text.insert_str(insertion.index, &" ".repeat(insertion.spaces));
    }

    let markers = line
        .markers
        .iter()
        .map(|marker| {
            let shift: usize = insertions
                .iter()
                .take_while(|insertion| insertion.index <= marker.span.start)
                .map(|insertion| insertion.spaces)
                .sum();
            Marker {
                chord: marker.chord.clone(),
                span: marker.span.start + shift..marker.span.end + shift,
            }
        })
        .collect();

    Line { text, markers }
}

/// The line exactly as stored, markers included.
pub fn raw(line: &Line) -> String {
    line.text.clone()
}

/// The lyric text with every marker removed.
pub fn lyrics(line: &Line) -> String {
    line.segments()
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Marker(_) => None,
        })
        .collect()
}

/// The line with each marker replaced by `wrapper.wrap(chord)`.
pub fn chorded<W>(line: &Line, wrapper: &W, pad: bool) -> String
where
    W: ChordWrapper + ?Sized,
{
    let padded;
    let line = if pad {
        padded = pad_line(line);
        &padded
    } else {
        line
    };

    let mut out = String::with_capacity(line.text.len());
    for segment in line.segments() {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Marker(marker) => out.push_str(&wrapper.wrap(&marker.chord)),
        }
    }
    out
}

/// Chords drawn on their own line above the lyric.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StackedLine {
    pub chords: String,
    pub lyrics: String,
}

/// Lay the line out as a chord line over a lyric line.
///
/// Each chord starts in the column of its marker within the lyric. The lyric is
/// padded so every chord is followed by at least one blank column before the
/// next one.
pub fn stacked(line: &Line) -> StackedLine {
    let padded = apply_insertions(line, &spaced_insertions(line, 1));
    let mut chords = String::new();
    let mut lyric = String::with_capacity(padded.text.len());

    for segment in padded.segments() {
        match segment {
            Segment::Text(text) => lyric.push_str(text),
            Segment::Marker(marker) => {
                let column = lyric.width();
                let drawn = chords.width();
                chords.push_str(&" ".repeat(column.saturating_sub(drawn)));
                chords.push_str(&marker.chord);
            }
        }
    }

    StackedLine {
        chords: chords.trim_end().to_string(),
        lyrics: lyric.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn padded(text: &str) -> String {
        pad_line(&parse_line(text)).text
    }

    #[test]
    fn test_no_padding_when_lyrics_are_wide_enough() {
        assert_eq!(padded("{G}Hello {C}world"), "{G}Hello {C}world");
        assert_eq!(padded("No chords here"), "No chords here");
    }

    #[test]
    fn test_padding_inserted_at_start_of_word() {
        assert_eq!(padded("{C#m7}I {A}love"), "{C#m7}I   {A}love");
        assert_eq!(padded("{Gsus}Oh, {D}my"), "{Gsus}Oh, {D}my");
        assert_eq!(padded("{Gsus}O {D}my {Em}soul"), "{Gsus}O   {D}my {Em}soul");
    }

    #[test]
    fn test_padding_without_whitespace_goes_before_marker() {
        assert_eq!(padded("{A}{B}x"), "{A} {B}x");
        assert_eq!(padded("{Cmaj9}Hal{D}le"), "{Cmaj9}Hal  {D}le");
    }

    #[test]
    fn test_padding_only_counts_gap_after_previous_marker() {
        // The space before the first marker must not be reused
        assert_eq!(padded("Oh {Em7}a{D}men"), "Oh {Em7}a  {D}men");
    }

    #[test]
    fn test_padding_uses_display_width() {
        // Wide characters absorb two columns each
        assert_eq!(padded("{Am7}愛愛{C}x"), "{Am7}愛愛{C}x");
        assert_eq!(padded("{Am7}愛{C}x"), "{Am7}愛 {C}x");
    }

    #[test]
    fn test_padding_keeps_markers_and_lyrics() {
        let lines = [
            "{C#m7}I {A}love {E/G#}You, {F#m7}Lord",
            "{A}{B}{C}{D}",
            "Plain {Bbm}text {(F#m)}with {?}markers",
        ];
        for text in lines {
            let line = parse_line(text);
            let padded = pad_line(&line);

            let before: Vec<&str> = line.markers.iter().map(|m| m.chord.as_str()).collect();
            let after: Vec<&str> = padded.markers.iter().map(|m| m.chord.as_str()).collect();
            assert_eq!(before, after);

            for marker in &padded.markers {
                assert_eq!(&padded.text[marker.span.clone()], format!("{{{}}}", marker.chord));
            }

            let squash = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(squash(lyrics(&padded)), squash(lyrics(&line)));
        }
    }

    #[test]
    fn test_lyrics_and_raw_views() {
        let line = parse_line("{G}Amazing {C/G}grace");
        assert_eq!(lyrics(&line), "Amazing grace");
        assert_eq!(raw(&line), "{G}Amazing {C/G}grace");
        assert_eq!(lyrics(&parse_line("{G}{D}")), "");
    }

    #[test]
    fn test_chorded_with_wrappers() {
        let line = parse_line("{C#m7}I {A}love");
        let bold = Wrapper::new("<b>", "</b>");
        assert_eq!(chorded(&line, &bold, false), "<b>C#m7</b>I <b>A</b>love");
        assert_eq!(chorded(&line, &bold, true), "<b>C#m7</b>I   <b>A</b>love");

        let brackets = |chord: &str| format!("[{}]", chord);
        assert_eq!(chorded(&line, &brackets, false), "[C#m7]I [A]love");
    }

    #[test]
    fn test_stacked_places_chords_over_syllables() {
        let stacked_line = stacked(&parse_line("{G}Amazing {C}grace, how {G}sweet"));
        assert_eq!(stacked_line.chords, "G       C          G");
        assert_eq!(stacked_line.lyrics, "Amazing grace, how sweet");
    }

    #[test]
    fn test_stacked_uses_padding() {
        let stacked_line = stacked(&parse_line("{C#m7}I {A}love"));
        assert_eq!(stacked_line.chords, "C#m7 A");
        assert_eq!(stacked_line.lyrics, "I    love");
    }

    #[test]
    fn test_stacked_separates_adjacent_chords() {
        let stacked_line = stacked(&parse_line("{A}{B}x"));
        assert_eq!(stacked_line.chords, "A B");
        assert_eq!(stacked_line.lyrics, "  x");
    }

    #[test]
    fn test_stacked_keeps_chords_over_their_syllables() {
        let stacked_line = stacked(&parse_line("{Am}Hi{C}x"));
        assert_eq!(stacked_line.chords, "Am C");
        assert_eq!(stacked_line.lyrics, "Hi x");
        // The overlay view only reserves the chord's own width
        assert_eq!(padded("{Am}Hi{C}x"), "{Am}Hi{C}x");

        let stacked_line = stacked(&parse_line("{G}Amazing {D/F#}grace"));
        let column = stacked_line.chords.find("D/F#").unwrap();
        assert_eq!(&stacked_line.lyrics[column..], "grace");
    }
}
