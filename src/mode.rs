//! Mode change composition.
//!
//! A [`ModeChange`] represents one or more flag assertions or negations
//! for user or channel modes, keyed by target. Changes can be composed,
//! with contradictory flags cancelling out, and serialized into the
//! parameter string of a single `MODE` command.

use crate::error::{ProtocolError, Result};

/// A pending user or channel mode change.
///
/// Internally a mapping from mode letter to targets with an
/// asserted/negated state, preserving first-seen order so serialization
/// is deterministic. A `(letter, target)` pair holds at most one state
/// at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeChange {
    modes: Vec<LetterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LetterEntry {
    letter: char,
    targets: Vec<(String, bool)>,
}

impl ModeChange {
    /// A change asserting one mode letter on one target, e.g. `+o alice`.
    pub fn new(letter: char, target: &str) -> ModeChange {
        ModeChange {
            modes: vec![LetterEntry {
                letter,
                targets: vec![(target.to_string(), true)],
            }],
        }
    }

    /// Returns this change with every assertion flipped to a negation and
    /// vice versa. The explicit form of "invert": `+o` becomes `-o`.
    pub fn negated(mut self) -> ModeChange {
        for entry in &mut self.modes {
            for (_, asserted) in &mut entry.targets {
                *asserted = !*asserted;
            }
        }
        self
    }

    /// Add or overwrite one `(letter, target)` flag.
    pub fn insert(&mut self, letter: char, target: &str, asserted: bool) {
        match self.modes.iter_mut().find(|e| e.letter == letter) {
            Some(entry) => match entry.targets.iter_mut().find(|(t, _)| t == target) {
                Some((_, state)) => *state = asserted,
                None => entry.targets.push((target.to_string(), asserted)),
            },
            None => self.modes.push(LetterEntry {
                letter,
                targets: vec![(target.to_string(), asserted)],
            }),
        }
    }

    /// Merge `other` into `self`, one-directionally.
    ///
    /// Letters absent from `self` are inserted wholesale. For a letter
    /// already present, a target carried by `other` with the opposite
    /// state cancels the existing entry (`+o` then `-o` on the same
    /// target nets to nothing); a letter left with no targets is dropped.
    ///
    /// A non-conflicting target under an already-present letter is *not*
    /// inserted. This asymmetry is long-standing behavior, kept as-is.
    /// TODO: confirm with the protocol owners whether non-conflicting
    /// targets should merge in instead of being discarded.
    pub fn compose(&mut self, other: ModeChange) {
        for entry in other.modes {
            match self.modes.iter_mut().find(|e| e.letter == entry.letter) {
                None => self.modes.push(entry),
                Some(existing) => {
                    for (target, asserted) in entry.targets {
                        let conflict = existing
                            .targets
                            .iter()
                            .position(|(t, a)| *t == target && *a != asserted);
                        if let Some(pos) = conflict {
                            existing.targets.remove(pos);
                        }
                    }
                }
            }
        }
        self.modes.retain(|e| !e.targets.is_empty());
    }

    /// True when no flags remain (e.g. after full cancellation).
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Serialize into `MODE` parameters: `"<targets> <flags>"`.
    ///
    /// Targets are all distinct targets across all letters in first-seen
    /// order, space-joined; flags are `+x`/`-x` tokens concatenated in
    /// iteration order. Composing down to an empty change is invalid to
    /// send and fails with [`ProtocolError::EmptyMode`].
    pub fn serialize(&self) -> Result<String> {
        let mut targets: Vec<&str> = Vec::new();
        let mut flags = String::new();

        for entry in &self.modes {
            for (target, asserted) in &entry.targets {
                if !targets.contains(&target.as_str()) {
                    targets.push(target);
                }
                flags.push(if *asserted { '+' } else { '-' });
                flags.push(entry.letter);
            }
        }

        if targets.is_empty() {
            return Err(ProtocolError::EmptyMode);
        }

        Ok(format!("{} {}", targets.join(" "), flags))
    }
}
