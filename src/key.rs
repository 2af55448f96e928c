//! # Key Model
//!
//! Pitch classes, every accepted spelling of a key name, and the rule that picks
//! which enharmonic spelling to display.
//!
//! ## Pitch Classes
//! The twelve pitch classes are numbered from A♭:
//!
//! ```text
//! 0  A♭    3  B     6  D     9  F
//! 1  A     4  C     7  E♭    10 F#
//! 2  B♭    5  C#    8  E     11 G
//! ```
//!
//! The names above are the canonical spellings (the most common name for each
//! pitch class). All arithmetic is modulo 12.
//!
//! ## Spellings
//! Twenty-one names map onto the twelve pitch classes (`A#` and `B♭` are both 2,
//! `B#` and `C` are both 4, ...). Each spelling records:
//! - the accidental family of the key it names (`F` is a flat key, `A` a sharp key)
//! - whether it may be displayed when the governing key prefers sharps
//! - whether it may be displayed when the governing key prefers flats
//!
//! ## Display Rule
//! [`display_spelling`] filters the spellings of a pitch class by the governing
//! key's preference, then breaks a remaining tie in favour of the natural
//! letter (`B` over `C♭`). The same pitch class is therefore written `C#` in the
//! key of E but `D♭` in the key of A♭.
//!
//! ## Example
//! ```rust
//! use songsheet::key::{display_spelling, resolve_key};
//!
//! let c_sharp = resolve_key("Db").unwrap();
//! assert_eq!(c_sharp.name(), "C#");
//!
//! let e = resolve_key("E").unwrap();
//! let a_flat = resolve_key("Ab").unwrap();
//! assert_eq!(display_spelling(c_sharp, e).unwrap(), "C#");
//! assert_eq!(display_spelling(c_sharp, a_flat).unwrap(), "D♭");
//! ```

use crate::error::{Result, SongError};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

pub const FLAT: char = '♭';
pub const SHARP: char = '#';

const CANONICAL_NAMES: [&str; 12] = [
    "A♭", "A", "B♭", "B", "C", "C#", "D", "E♭", "E", "F", "F#", "G",
];

/// One of the twelve equal-tempered pitch classes, spelling independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const COUNT: u8 = 12;

    /// Build a pitch class from any integer, wrapping modulo 12.
    pub fn new(value: u8) -> Self {
        Self(value % Self::COUNT)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Move up by `semitones`, wrapping around the octave.
    pub fn shift(self, semitones: u8) -> Self {
        Self::new(self.0 + semitones % Self::COUNT)
    }

    /// Number of semitones (0..12) to move upward from `self` to reach `other`.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 + Self::COUNT - self.0) % Self::COUNT
    }

    /// The canonical (most common) spelling, e.g. `B♭` rather than `A#`.
    pub fn name(self) -> &'static str {
        CANONICAL_NAMES[self.0 as usize]
    }

    /// Accidental family of the key named by this pitch class.
    ///
    /// This is what a governing key contributes to spelling decisions.
    pub fn modifier(self) -> Modifier {
        spelling(self.name())
            .map(|s| s.modifier)
            .unwrap_or(Modifier::Natural)
    }

    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..Self::COUNT).map(PitchClass)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PitchClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accidental sign, valued in semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Modifier {
    pub fn offset(self) -> i8 {
        match self {
            Modifier::DoubleFlat => -2,
            Modifier::Flat => -1,
            Modifier::Natural => 0,
            Modifier::Sharp => 1,
            Modifier::DoubleSharp => 2,
        }
    }

    pub fn prefers_flats(self) -> bool {
        self.offset() < 0
    }

    pub fn prefers_sharps(self) -> bool {
        self.offset() > 0
    }
}

/// A display name for a pitch class plus its display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpelling {
    pub name: &'static str,
    pub pitch_class: PitchClass,
    pub modifier: Modifier,
    pub usable_with_sharps: bool,
    pub usable_with_flats: bool,
}

impl KeySpelling {
    const fn new(
        name: &'static str,
        pitch_class: u8,
        modifier: Modifier,
        usable_with_sharps: bool,
        usable_with_flats: bool,
    ) -> Self {
        Self {
            name,
            pitch_class: PitchClass(pitch_class),
            modifier,
            usable_with_sharps,
            usable_with_flats,
        }
    }

    /// True for a bare letter name such as `B` (as opposed to `C♭`).
    pub fn is_natural_letter(&self) -> bool {
        !self.name.ends_with(FLAT) && !self.name.ends_with(SHARP)
    }
}

use Modifier::{Flat, Natural, Sharp};

/// Every accepted key spelling.
pub static SPELLINGS: [KeySpelling; 21] = [
    KeySpelling::new("A♭", 0, Flat, false, true),
    KeySpelling::new("A", 1, Sharp, true, true),
    KeySpelling::new("A#", 2, Sharp, true, false),
    KeySpelling::new("B♭", 2, Flat, false, true),
    KeySpelling::new("B", 3, Sharp, true, true),
    KeySpelling::new("B#", 4, Sharp, true, false),
    KeySpelling::new("C♭", 3, Flat, false, true),
    KeySpelling::new("C", 4, Natural, true, true),
    KeySpelling::new("C#", 5, Sharp, true, false),
    KeySpelling::new("D♭", 5, Flat, false, true),
    KeySpelling::new("D", 6, Sharp, true, true),
    KeySpelling::new("D#", 7, Sharp, true, false),
    KeySpelling::new("E♭", 7, Flat, false, true),
    KeySpelling::new("E", 8, Sharp, true, true),
    KeySpelling::new("E#", 9, Sharp, true, false),
    KeySpelling::new("F♭", 8, Flat, false, true),
    KeySpelling::new("F", 9, Flat, true, true),
    KeySpelling::new("F#", 10, Sharp, true, false),
    KeySpelling::new("G♭", 10, Flat, false, true),
    KeySpelling::new("G", 11, Sharp, true, true),
    KeySpelling::new("G#", 0, Sharp, true, false),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static KeySpelling>> =
    Lazy::new(|| SPELLINGS.iter().map(|s| (s.name, s)).collect());

static BY_PITCH_CLASS: Lazy<Vec<Vec<&'static KeySpelling>>> = Lazy::new(|| {
    let mut table = vec![Vec::new(); PitchClass::COUNT as usize];
    for s in SPELLINGS.iter() {
        table[s.pitch_class.index() as usize].push(s);
    }
    table
});

/// Look up a spelling by its exact display name (`♭`, not `b`).
pub fn spelling(name: &str) -> Option<&'static KeySpelling> {
    BY_NAME.get(name).copied()
}

/// All spellings of a pitch class, in table order.
pub fn spellings_of(pitch_class: PitchClass) -> &'static [&'static KeySpelling] {
    &BY_PITCH_CLASS[pitch_class.index() as usize]
}

/// Resolve a key name to its pitch class.
///
/// A lowercase `b` is read as a flat sign, so `Bb`, `B♭` and `A#` all resolve to
/// the same pitch class. Anything not in the spelling table (including the empty
/// string) resolves to `None`.
pub fn resolve_key(name: &str) -> Option<PitchClass> {
    let normalized = name.replace('b', "♭");
    spelling(&normalized).map(|s| s.pitch_class)
}

/// Choose how to write `pitch_class` in a song governed by `governing`.
///
/// # Errors
/// Returns [`SongError::SpellingError`] when the spelling table yields an
/// unusable candidate set. The shipped table never does; the error exists so a
/// broken table is reported instead of silently guessed around.
pub fn display_spelling(pitch_class: PitchClass, governing: PitchClass) -> Result<&'static str> {
    let all = spellings_of(pitch_class);
    if let [only] = all {
        return Ok(only.name);
    }

    let preference = governing.modifier();
    let candidates: Vec<&KeySpelling> = all
        .iter()
        .copied()
        .filter(|s| {
            if preference.prefers_flats() {
                s.usable_with_flats
            } else if preference.prefers_sharps() {
                s.usable_with_sharps
            } else {
                true
            }
        })
        .collect();

    let chosen = match candidates.as_slice() {
        [only] => Some(only.name),
        [first, second] => [first, second]
            .into_iter()
            .find(|s| s.is_natural_letter())
            // Both altered only happens under a natural key (C): use the common name
            .or_else(|| [first, second].into_iter().find(|s| s.name == pitch_class.name()))
            .map(|s| s.name),
        _ => None,
    };

    chosen.ok_or(SongError::SpellingError {
        pitch_class: pitch_class.index(),
        governing: governing.index(),
        candidates: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> PitchClass {
        resolve_key(name).unwrap()
    }

    #[test]
    fn test_resolve_key_all_spellings() {
        let cases = [
            ("A♭", 0), ("Ab", 0), ("A", 1), ("A#", 2),
            ("B♭", 2), ("Bb", 2), ("B", 3), ("B#", 4),
            ("C♭", 3), ("Cb", 3), ("C", 4), ("C#", 5),
            ("D♭", 5), ("Db", 5), ("D", 6), ("D#", 7),
            ("E♭", 7), ("Eb", 7), ("E", 8), ("E#", 9),
            ("F♭", 8), ("Fb", 8), ("F", 9), ("F#", 10),
            ("G♭", 10), ("Gb", 10), ("G", 11), ("G#", 0),
        ];
        for (name, expected) in cases {
            assert_eq!(resolve_key(name), Some(PitchClass::new(expected)), "resolving {}", name);
        }
    }

    #[test]
    fn test_resolve_key_rejects_unknown() {
        assert_eq!(resolve_key("X"), None);
        assert_eq!(resolve_key(""), None);
        assert_eq!(resolve_key(" C"), None);
        assert_eq!(resolve_key("c"), None);
        assert_eq!(resolve_key("bb"), None);
    }

    #[test]
    fn test_table_is_consistent_with_letter_names() {
        // Letter name plus accidental must land on the recorded pitch class
        for s in SPELLINGS.iter() {
            let letter = &s.name[..1];
            let natural = spelling(letter).unwrap().pitch_class.index() as i8;
            let accidental = if s.name.ends_with(FLAT) {
                Modifier::Flat
            } else if s.name.ends_with(SHARP) {
                Modifier::Sharp
            } else {
                Modifier::Natural
            };
            let expected = (natural + accidental.offset()).rem_euclid(12) as u8;
            assert_eq!(s.pitch_class.index(), expected, "{}", s.name);
        }
    }

    #[test]
    fn test_every_pitch_class_has_sharp_and_flat_spelling() {
        for pc in PitchClass::all() {
            let spellings = spellings_of(pc);
            assert!(spellings.iter().any(|s| s.usable_with_sharps), "{}", pc);
            assert!(spellings.iter().any(|s| s.usable_with_flats), "{}", pc);
            for s in spellings.iter().filter(|s| s.is_natural_letter()) {
                assert!(s.usable_with_sharps && s.usable_with_flats, "{}", s.name);
            }
        }
    }

    #[test]
    fn test_display_spelling_defined_for_all_pairs() {
        for pc in PitchClass::all() {
            for governing in PitchClass::all() {
                let name = display_spelling(pc, governing)
                    .unwrap_or_else(|e| panic!("{} under {}: {}", pc, governing, e));
                assert_eq!(resolve_key(name), Some(pc));
            }
        }
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for pc in PitchClass::all() {
            // Governed by itself, a key is always written the usual way
            assert_eq!(display_spelling(pc, pc).unwrap(), pc.name());
            assert_eq!(key(pc.name()), pc);
        }
    }

    #[test]
    fn test_display_prefers_governing_accidentals() {
        assert_eq!(display_spelling(key("C#"), key("E")).unwrap(), "C#");
        assert_eq!(display_spelling(key("C#"), key("Ab")).unwrap(), "D♭");
        assert_eq!(display_spelling(key("Bb"), key("F")).unwrap(), "B♭");
        assert_eq!(display_spelling(key("Bb"), key("B")).unwrap(), "A#");
        // Natural letter wins when both spellings are allowed
        assert_eq!(display_spelling(key("B"), key("Eb")).unwrap(), "B");
        assert_eq!(display_spelling(key("C"), key("F#")).unwrap(), "C");
        // Under C both altered spellings are allowed; the common one is kept
        assert_eq!(display_spelling(key("G#"), key("C")).unwrap(), "A♭");
        assert_eq!(display_spelling(key("A#"), key("C")).unwrap(), "B♭");
        assert_eq!(display_spelling(key("Gb"), key("C")).unwrap(), "F#");
    }

    #[test]
    fn test_interval_and_shift() {
        assert_eq!(key("G").interval_to(key("E")), 9);
        assert_eq!(key("E").interval_to(key("G")), 3);
        assert_eq!(key("G").shift(9), key("E"));
        assert_eq!(key("Ab").shift(11), key("G"));
        assert_eq!(PitchClass::new(25), PitchClass::new(1));
    }

    #[test]
    fn test_governing_modifiers() {
        assert_eq!(key("C").modifier(), Modifier::Natural);
        assert_eq!(key("F").modifier(), Modifier::Flat);
        assert_eq!(key("A").modifier(), Modifier::Sharp);
        assert_eq!(key("Db").modifier(), Modifier::Sharp); // canonical name is C#
    }
}
