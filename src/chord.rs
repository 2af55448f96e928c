//! # Chord Token Parser
//!
//! Splits a chord name such as `F#m7` or `(Bbsus)` into a root, a quality and an
//! optional flag.
//!
//! ## Suffix Matching
//! Qualities are recognized by suffix, tested in the fixed order of
//! [`QUALITY_SUFFIXES`]. Longer and more specific suffixes come first, so `Em7`
//! is a minor seventh (`m7`) and never a seventh on the root `Em`. Whatever
//! precedes the matched suffix is the root. When nothing matches the chord is
//! major and the whole string is the root.
//!
//! Several spellings map to the same quality (`min`/`m`, `maj7`/`M7`/`7`, ...);
//! rendering always uses [`ChordQuality::suffix`], which is how chords end up in
//! canonical form after transposition.
//!
//! ## Example
//! ```rust
//! use songsheet::chord::{parse_chord, ChordQuality};
//!
//! let chord = parse_chord("(F#min)");
//! assert_eq!(chord.root_text, "F#");
//! assert_eq!(chord.quality, ChordQuality::Minor);
//! assert!(chord.is_optional);
//! ```

use crate::key::{resolve_key, PitchClass};
use serde::Serialize;

/// Separates chords that may be played interchangeably: `Bm|B7`.
pub const ALTERNATIVE_SEPARATOR: char = '|';
/// Separates a chord from its bass note: `D/F#`.
pub const BASS_SEPARATOR: char = '/';

/// Structural chord type, independent of the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChordQuality {
    /// 1, 3, 5
    Major,
    /// 1, ♭3, 5
    Minor,
    /// 1, 4, 5
    Suspended,
    /// 1, 3, 5, 6
    MajorSixth,
    /// 1, 3, 5, 7
    MajorSeventh,
    /// 1, ♭3, 5, 7
    MinorSeventh,
    /// 1, 4, 5, 7
    SuspendedSeventh,
    /// 1, 2, 5
    MajorSuspendedSecond,
    /// 1, 3, 5, 7, 9
    MajorNinth,
    /// 1, 2, 3, 5
    MajorAddNinth,
    /// 1, ♭3, 5, ♭7, 9
    MinorNinth,
    /// 1, 5
    PowerChord,
    /// 1, 3, #5
    Augmented,
    /// 1, ♭3, ♭5
    Diminished,
}

impl ChordQuality {
    /// Canonical suffix written after the root.
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Suspended => "sus",
            ChordQuality::MajorSixth => "6",
            ChordQuality::MajorSeventh => "7",
            ChordQuality::MinorSeventh => "m7",
            ChordQuality::SuspendedSeventh => "sus7",
            ChordQuality::MajorSuspendedSecond => "2",
            ChordQuality::MajorNinth => "maj9",
            ChordQuality::MajorAddNinth => "9",
            ChordQuality::MinorNinth => "m9",
            ChordQuality::PowerChord => "5",
            ChordQuality::Augmented => "+",
            ChordQuality::Diminished => "o",
        }
    }
}

/// Recognized suffixes in match priority order.
pub const QUALITY_SUFFIXES: &[(&str, ChordQuality)] = &[
    ("(no3)", ChordQuality::PowerChord),
    ("7sus4", ChordQuality::SuspendedSeventh),
    ("sus7", ChordQuality::SuspendedSeventh),
    ("sus4", ChordQuality::Suspended),
    ("sus2", ChordQuality::MajorSuspendedSecond),
    ("maj9", ChordQuality::MajorNinth),
    ("maj7", ChordQuality::MajorSeventh),
    ("add9", ChordQuality::MajorAddNinth),
    ("min7", ChordQuality::MinorSeventh),
    ("aug", ChordQuality::Augmented),
    ("dim", ChordQuality::Diminished),
    ("min", ChordQuality::Minor),
    ("sus", ChordQuality::Suspended),
    ("m7", ChordQuality::MinorSeventh),
    ("m9", ChordQuality::MinorNinth),
    ("M7", ChordQuality::MajorSeventh),
    ("+", ChordQuality::Augmented),
    ("o", ChordQuality::Diminished),
    ("m", ChordQuality::Minor),
    ("6", ChordQuality::MajorSixth),
    ("7", ChordQuality::MajorSeventh),
    ("2", ChordQuality::MajorSuspendedSecond),
    ("9", ChordQuality::MajorAddNinth),
    ("5", ChordQuality::PowerChord),
];

/// A single chord (one side of a slash chord) split into its parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordToken {
    /// The text this token was parsed from.
    pub raw: String,
    /// Root as written, e.g. `Bb` or `C#`.
    pub root_text: String,
    /// `None` when the root is not a known key name.
    pub root: Option<PitchClass>,
    pub quality: ChordQuality,
    /// Wrapped in parentheses in the source: `(Am)`.
    pub is_optional: bool,
}

impl ChordToken {
    pub fn is_recognized(&self) -> bool {
        self.root.is_some()
    }

    /// Write the chord with `root_name` as its root, the canonical quality suffix
    /// and the optional parentheses.
    pub fn render(&self, root_name: &str) -> String {
        let chord = format!("{}{}", root_name, self.quality.suffix());
        if self.is_optional {
            format!("({})", chord)
        } else {
            chord
        }
    }
}

/// Parse one chord name.
///
/// Never fails: an unknown root leaves [`ChordToken::root`] empty.
pub fn parse_chord(text: &str) -> ChordToken {
    let (body, is_optional) = match text
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (text, false),
    };

    let (root_text, quality) = QUALITY_SUFFIXES
        .iter()
        .find_map(|(suffix, quality)| body.strip_suffix(suffix).map(|root| (root, *quality)))
        .unwrap_or((body, ChordQuality::Major));

    ChordToken {
        raw: text.to_string(),
        root_text: root_text.to_string(),
        root: resolve_key(root_text),
        quality,
        is_optional,
    }
}

/// The inside of a compound symbol wrapped in one pair of parentheses.
///
/// `(D/F#)` and `(Bm|B7)` yield `D/F#` and `Bm|B7`. A single chord such as
/// `(Am)` yields `None` because [`parse_chord`] handles its parentheses, and so
/// does `(D)/(F#)` where the outer parentheses do not pair with each other.
pub fn strip_optional_group(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    if !inner.contains(&[ALTERNATIVE_SEPARATOR, BASS_SEPARATOR][..]) {
        return None;
    }
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Parse a full chord symbol, splitting alternatives (`|`) and slash chords (`/`).
///
/// Tokens are returned left to right, e.g. `D/F#|G` yields `D`, `F#`, `G`.
/// Parentheses around the whole symbol mark every token optional.
pub fn parse_chord_symbol(text: &str) -> Vec<ChordToken> {
    let (body, is_optional) = match strip_optional_group(text) {
        Some(inner) => (inner, true),
        None => (text, false),
    };
    body.split(ALTERNATIVE_SEPARATOR)
        .flat_map(|alternative| alternative.split(BASS_SEPARATOR))
        .map(|part| {
            let mut token = parse_chord(part);
            token.is_optional |= is_optional;
            token
        })
        .collect()
}
