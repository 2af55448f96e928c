//! # Chord Line Merger
//!
//! Converts charts written with chords on their own line into inline markers:
//!
//! ```text
//! G       C          G              {G}Amazing {C}grace, how {G}sweet
//! Amazing grace, how sweet    →
//! ```
//!
//! A line is a chord line when every whitespace-separated word on it is a
//! chord with a known root. A chord line is merged into the lyric line right
//! below it, each chord inserted at the display column it occupied. A chord line
//! with no lyric below it (followed by a blank line, a section header, another
//! chord line or the end of the text) becomes a line of markers on its own.
//!
//! Blank lines are dropped and every section header is preceded by one blank
//! line, the layout the song parser expects.

use crate::ast::{MARKER_CLOSE, MARKER_OPEN};
use crate::chord::parse_chord_symbol;
use crate::parser::is_header_delimiter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// True when every word on the line is a recognized chord symbol.
pub fn is_chord_line(line: &str) -> bool {
    let mut words = line.split_whitespace().peekable();
    if words.peek().is_none() {
        return false;
    }
    words.all(|word| {
        parse_chord_symbol(word)
            .iter()
            .all(|token| token.is_recognized())
    })
}

fn is_section_header(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

/// Words of a chord line with the display column each one starts at.
fn chord_columns(line: &str) -> Vec<(usize, &str)> {
    let mut chords = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut column = 0;

    for (index, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some((byte, col)) = start.take() {
                chords.push((col, &line[byte..index]));
            }
        } else if start.is_none() {
            start = Some((index, column));
        }
        column += c.width().unwrap_or(0);
    }
    if let Some((byte, col)) = start {
        chords.push((col, &line[byte..]));
    }
    chords
}

/// Byte offset of the first character starting at or after `column`.
fn byte_at_column(text: &str, column: usize) -> usize {
    let mut width = 0;
    for (index, c) in text.char_indices() {
        if width >= column {
            return index;
        }
        width += c.width().unwrap_or(0);
    }
    text.len()
}

/// Insert the chords of `chords` into `lyric` at their columns.
pub fn merge_lines(chords: &str, lyric: &str) -> String {
    let columns = chord_columns(chords);
    let mut merged = lyric.trim_end().to_string();

    if let Some((last, _)) = columns.last() {
        let width = merged.width();
        if width < *last {
            merged.push_str(&" ".repeat(last - width));
        }
    }

    for (column, chord) in columns.iter().rev() {
        let index = byte_at_column(&merged, *column);
        let marker = format!("{}{}{}", MARKER_OPEN, chord, MARKER_CLOSE);
        merged.insert_str(index, &marker);
    }

    merged.trim_end().to_string()
}

/// Merge every chord line of a song body into the lyric line below it.
pub fn merge_chord_lines(body: &str) -> String {
    let mut output: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;

    for line in body.lines() {
        let trimmed = line.trim();

        if is_section_header(trimmed) {
            if let Some(chords) = pending.take() {
                output.push(merge_lines(chords, ""));
            }
            if !output.is_empty() {
                output.push(String::new());
            }
            output.push(trimmed.to_string());
            continue;
        }

        if trimmed.is_empty() {
            if let Some(chords) = pending.take() {
                output.push(merge_lines(chords, ""));
            }
            continue;
        }

        if is_chord_line(line) {
            if let Some(chords) = pending.replace(line) {
                output.push(merge_lines(chords, ""));
            }
            continue;
        }

        match pending.take() {
            Some(chords) => output.push(merge_lines(chords, line)),
            None => output.push(line.trim_end().to_string()),
        }
    }

    if let Some(chords) = pending {
        output.push(merge_lines(chords, ""));
    }

    log::debug!("Merged chord chart into {} lines", output.len());
    output.join("\n")
}

/// Merge a whole document, keeping its metadata header as written.
pub fn merge_document(source: &str) -> String {
    let mut header = Vec::new();
    let mut lines = source.lines();

    if source.lines().any(is_header_delimiter) {
        for line in lines.by_ref() {
            header.push(line.trim_end());
            if is_header_delimiter(line) {
                break;
            }
        }
    }

    let body: Vec<&str> = lines.collect();
    let merged = merge_chord_lines(&body.join("\n"));
    if header.is_empty() {
        merged
    } else {
        format!("{}\n{}", header.join("\n"), merged)
    }
}
