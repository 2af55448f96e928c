pub mod api;
pub mod ast;
pub mod chord;
pub mod error;
pub mod key;
pub mod layout;
pub mod merge;
pub mod options;
pub mod parser;
pub mod transpose;

pub use api::{render, render_song, summarize_song, RenderedLine, RenderedSection, RenderedSong, SongSummary};
pub use ast::*;
pub use error::*;
pub use key::{resolve_key, PitchClass};
pub use layout::{ChordWrapper, Wrapper};
pub use merge::merge_document;
pub use options::RenderOptions;
pub use parser::{parse_metadata, parse_song};
pub use transpose::{transpose, transpose_song, Transposer};

/// Parse a song document and transpose it to `target_key` (e.g. "A", "Bb", "F#").
pub fn transpose_document(source: &str, target_key: &str) -> Result<Song> {
    let target = resolve_key(target_key.trim())
        .ok_or_else(|| SongError::KeyError(target_key.to_string()))?;
    transpose_song(&parse_song(source), Some(target))
}
