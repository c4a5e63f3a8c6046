//! Character-set labels on automaton edges.
//!
//! A [`Transition`] is a canonical set of disjoint, sorted, half-open code
//! point ranges. The empty set doubles as the ε-transition: whether a label is
//! traversed as ε is decided by [`Transition::is_epsilon`] during closure
//! computation, while [`Transition::matches`] implements the character
//! discipline only (ε never matches a character).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use itertools::Itertools;

/// First code point of the supported alphabet (space).
pub const ALPHABET_START: u32 = 0x20;

/// One past the last code point of the supported alphabet (`~` is `0x7e`).
pub const ALPHABET_END: u32 = 0x7f;

/// A set of disjoint, sorted, half-open code point ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition {
    ranges: Vec<(u32, u32)>,
}

impl Transition {
    /// Create a canonical [`Transition`] from arbitrary half-open ranges.
    ///
    /// Empty ranges are dropped; overlapping and adjacent ranges are coalesced
    /// so that equality and hashing work on the canonical form.
    pub fn new<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut merged: Vec<(u32, u32)> = Vec::new();

        for (lo, hi) in ranges.into_iter().filter(|&(lo, hi)| lo < hi).sorted() {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }

        Transition { ranges: merged }
    }

    /// The ε-transition.
    pub fn epsilon() -> Self {
        Transition { ranges: Vec::new() }
    }

    /// A label matching every alphabet character except the newline.
    pub fn dot() -> Self {
        Transition {
            ranges: vec![(ALPHABET_START, ALPHABET_END)],
        }
    }

    /// The complement of this label against the printable alphabet.
    ///
    /// Code points outside `[ALPHABET_START, ALPHABET_END)` never appear in
    /// the result, so a complemented class keeps excluding the newline.
    pub fn complement(&self) -> Self {
        let mut ranges = Vec::new();
        let mut cursor = ALPHABET_START;

        for &(lo, hi) in &self.ranges {
            if lo > cursor {
                ranges.push((cursor, lo.min(ALPHABET_END)));
            }
            cursor = cursor.max(hi);
        }
        if cursor < ALPHABET_END {
            ranges.push((cursor, ALPHABET_END));
        }

        Transition::new(ranges)
    }

    pub fn is_epsilon(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether a character is matched when this label is taken as a
    /// character transition. ε matches nothing here.
    pub fn matches(&self, c: char) -> bool {
        self.contains(c as u32)
    }

    /// Whether a raw code point falls inside one of the ranges.
    pub fn contains(&self, point: u32) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if point < lo {
                    std::cmp::Ordering::Greater
                } else if point >= hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    /// A stable fingerprint of the canonical range tuple.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.ranges.hash(&mut hasher);
        hasher.finish()
    }
}

impl From<char> for Transition {
    fn from(c: char) -> Self {
        let point = c as u32;
        Transition {
            ranges: vec![(point, point + 1)],
        }
    }
}
