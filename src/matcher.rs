//! Keystroke sequence matcher
//!
//! Per-session runtime state: a small ring buffer of the last few keystrokes,
//! matched against the resolver table on every new key. Candidate sequences
//! grow from the newest key backwards and the shortest match wins, so a bound
//! single key always fires even when it is also the start of a longer
//! sequence.

use std::collections::VecDeque;

use crate::key::MAX_SEQUENCE_KEYS;
use crate::mapping::KeyMapping;
use crate::resolver::ResolverTable;

/// Outcome of feeding one keystroke to the matcher.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyResolution {
    /// A real binding fired; the sequence buffer has been cleared.
    Matched {
        mapping: KeyMapping,
        /// Name of the section the winning binding came from.
        section: String,
    },
    /// The keystroke is part of a recognized sequence (or explicitly bound to
    /// the no-op command) and must be swallowed, not treated as unbound.
    Ignored,
    /// Nothing matched at any length; the caller may fall through to default
    /// handling.
    NoMatch,
}

/// Ring buffer of recent keystrokes plus the matching logic.
#[derive(Clone, Debug, Default)]
pub struct KeySequenceMatcher {
    /// Newest keystroke at the front; holds at most [`MAX_SEQUENCE_KEYS`].
    history: VecDeque<String>,
}

impl KeySequenceMatcher {
    pub fn new() -> KeySequenceMatcher {
        KeySequenceMatcher {
            history: VecDeque::with_capacity(MAX_SEQUENCE_KEYS),
        }
    }

    /// Feed one normalized keystroke unit and match it against the table.
    ///
    /// Tries the 1-key sequence first, then 2, 3, 4 — the shortest hit wins.
    /// A hit on a real action clears the history; an `ignore` hit (synthetic
    /// partial-sequence stand-in or an authored no-op) leaves it intact so
    /// the sequence can keep growing.
    pub fn resolve(&mut self, keystroke: String, table: &ResolverTable) -> KeyResolution {
        if self.history.len() == MAX_SEQUENCE_KEYS {
            self.history.pop_back();
        }
        self.history.push_front(keystroke);

        for len in 1..=self.history.len() {
            let key = self.window_joined(len);
            let Some(row) = table.lookup(&key) else {
                continue;
            };
            if row.mapping.is_ignore() {
                return KeyResolution::Ignored;
            }
            self.history.clear();
            return KeyResolution::Matched {
                mapping: row.mapping.clone(),
                section: row.section.clone(),
            };
        }

        KeyResolution::NoMatch
    }

    /// Forget any partial sequence: a higher-priority dispatch path consumed
    /// the keystroke before it reached this matcher.
    pub fn notify_handled_elsewhere(&mut self) {
        self.history.clear();
    }

    /// Number of buffered keystrokes.
    pub fn pending_len(&self) -> usize {
        self.history.len()
    }

    /// Buffered keystrokes in press order, for status display.
    pub fn pending_display(&self) -> Option<String> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.window_joined(self.history.len()))
        }
    }

    /// Join the most recent `len` keystrokes in chronological order.
    fn window_joined(&self, len: usize) -> String {
        let mut parts = Vec::with_capacity(len);
        for i in (0..len).rev() {
            parts.push(self.history[i].as_str());
        }
        parts.join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::KeyMapping;
    use crate::registry::SectionRegistry;

    fn table_with(bindings: &[(&str, &str)]) -> ResolverTable {
        let mut reg = SectionRegistry::new();
        reg.set_default_bindings(
            bindings
                .iter()
                .map(|(k, a)| KeyMapping::new(k, a, false, None, None))
                .collect(),
        );
        ResolverTable::build(&reg)
    }

    fn assert_matched(result: KeyResolution, action: &str) {
        match result {
            KeyResolution::Matched { mapping, .. } => {
                assert_eq!(mapping.action_string(), action)
            }
            other => panic!("expected Matched({}), got {:?}", action, other),
        }
    }

    #[test]
    fn test_single_key_match_clears_history() {
        let table = table_with(&[("q", "quit")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_matched(matcher.resolve("q".into(), &table), "quit");
        assert_eq!(matcher.pending_len(), 0);
    }

    #[test]
    fn test_no_match_keeps_history() {
        let table = table_with(&[("q", "quit")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("z".into(), &table), KeyResolution::NoMatch);
        assert_eq!(matcher.pending_len(), 1);
    }

    #[test]
    fn test_three_key_sequence() {
        let table = table_with(&[("a-b-c", "cmd3")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("a".into(), &table), KeyResolution::Ignored);
        assert_eq!(matcher.resolve("b".into(), &table), KeyResolution::Ignored);
        assert_matched(matcher.resolve("c".into(), &table), "cmd3");
        // History is empty after the full match
        assert_eq!(matcher.pending_len(), 0);
    }

    #[test]
    fn test_ignored_does_not_clear_history() {
        let table = table_with(&[("a-b", "cmd")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("a".into(), &table), KeyResolution::Ignored);
        assert_eq!(matcher.pending_len(), 1);
    }

    #[test]
    fn test_shortest_match_wins() {
        // "a" and "a-b" both bound: typing a fires "a" immediately and resets,
        // so a following b starts fresh instead of completing "a-b".
        let table = table_with(&[("a", "cmdA"), ("a-b", "cmdAB"), ("b", "cmdB")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_matched(matcher.resolve("a".into(), &table), "cmdA");
        assert_matched(matcher.resolve("b".into(), &table), "cmdB");
    }

    #[test]
    fn test_authored_ignore_swallows_key() {
        let table = table_with(&[("w", "ignore")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("w".into(), &table), KeyResolution::Ignored);
    }

    #[test]
    fn test_history_caps_at_four() {
        let table = table_with(&[("q", "quit")]);
        let mut matcher = KeySequenceMatcher::new();

        for key in ["1", "2", "3", "4", "5"] {
            assert_eq!(matcher.resolve(key.into(), &table), KeyResolution::NoMatch);
        }
        assert_eq!(matcher.pending_len(), 4);
        assert_eq!(matcher.pending_display().unwrap(), "2-3-4-5");
    }

    #[test]
    fn test_notify_handled_elsewhere_clears() {
        let table = table_with(&[("a-b", "cmd")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("a".into(), &table), KeyResolution::Ignored);
        matcher.notify_handled_elsewhere();
        assert_eq!(matcher.pending_len(), 0);

        // The stale prefix is gone: b alone does not complete a-b
        assert_eq!(matcher.resolve("b".into(), &table), KeyResolution::NoMatch);
    }

    #[test]
    fn test_interrupted_sequence_falls_back() {
        let table = table_with(&[("a-b", "cmd")]);
        let mut matcher = KeySequenceMatcher::new();

        assert_eq!(matcher.resolve("a".into(), &table), KeyResolution::Ignored);
        // "z" matches nothing at any length (z, a-z)
        assert_eq!(matcher.resolve("z".into(), &table), KeyResolution::NoMatch);
    }
}
