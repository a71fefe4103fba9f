//! Suppression of double-flushed lines in legacy logs.
//!
//! The legacy writer sometimes emits the same line twice within one
//! timestamp. Only lines sharing the current timestamp prefix are
//! remembered, so memory stays bounded by the busiest millisecond.

use hashbrown::HashSet;
use memchr::memmem;

#[derive(Debug, Default)]
pub struct LineDeduplicator {
    current_prefix: Option<String>,
    seen: HashSet<String>,
    suppressed: u64,
}

impl LineDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `line` repeats a line already seen within the
    /// same timestamp. Lines without a recognizable timestamp always pass.
    pub fn accept(&mut self, line: &str) -> bool {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(prefix) = timestamp_prefix(line) else {
            return true;
        };

        if self.current_prefix.as_deref() != Some(prefix) {
            self.current_prefix = Some(prefix.to_string());
            self.seen.clear();
        }

        if self.seen.insert(line.to_string()) {
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    /// Number of lines dropped so far.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn reset(&mut self) {
        self.current_prefix = None;
        self.seen.clear();
    }
}

/// The leading `M/D[/Y] H:M:S.f[+-Z]` part of a line, if it has one.
pub fn timestamp_prefix(line: &str) -> Option<&str> {
    let sep = memmem::find(line.as_bytes(), b"  ")?;
    let prefix = &line[..sep];
    is_timestamp_shape(prefix.as_bytes()).then_some(prefix)
}

fn is_timestamp_shape(b: &[u8]) -> bool {
    let mut i = 0;

    // Month `/` day, optionally `/YYYY`
    if !digits_then(b, &mut i, Some(b'/')) || !digits_then(b, &mut i, None) {
        return false;
    }
    if b.get(i) == Some(&b'/') {
        i += 1;
        if !digits_then(b, &mut i, None) {
            return false;
        }
    }
    if b.get(i) != Some(&b' ') {
        return false;
    }
    i += 1;

    if !digits_then(b, &mut i, Some(b':'))
        || !digits_then(b, &mut i, Some(b':'))
        || !digits_then(b, &mut i, Some(b'.'))
        || !digits_then(b, &mut i, None)
    {
        return false;
    }

    match b.get(i) {
        None => true,
        Some(b'+' | b'-') => {
            i += 1;
            digits_then(b, &mut i, None) && i == b.len()
        }
        Some(_) => false,
    }
}

/// Consume one or more ASCII digits, then the separator `sep` if given.
fn digits_then(b: &[u8], i: &mut usize, sep: Option<u8>) -> bool {
    let start = *i;
    while *i < b.len() && b[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i == start {
        return false;
    }
    match sep {
        Some(s) if b.get(*i) == Some(&s) => {
            *i += 1;
            true
        }
        Some(_) => false,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "5/21 21:28:22.712  SPELL_DAMAGE,a";
    const B: &str = "5/21 21:28:22.712  SPELL_DAMAGE,b";
    const C: &str = "5/21 21:28:22.713  SPELL_DAMAGE,a";

    #[test]
    fn test_suppresses_duplicate_within_timestamp() {
        let mut dedup = LineDeduplicator::new();
        assert!(dedup.accept(A));
        assert!(dedup.accept(B));
        assert!(!dedup.accept(A));
        assert!(!dedup.accept(B));
        assert_eq!(dedup.suppressed(), 2);
    }

    #[test]
    fn test_window_resets_on_new_timestamp() {
        let mut dedup = LineDeduplicator::new();
        assert!(dedup.accept(A));
        assert!(dedup.accept(C));
        // Same content as the first line, but the window moved on
        assert!(dedup.accept(A));
        assert_eq!(dedup.suppressed(), 0);
    }

    #[test]
    fn test_lines_without_timestamp_pass() {
        let mut dedup = LineDeduplicator::new();
        assert!(dedup.accept("not a log line"));
        assert!(dedup.accept("not a log line"));
        assert!(dedup.accept("5/21 xx:28:22.712  SPELL_DAMAGE,a"));
        assert!(dedup.accept("5/21 xx:28:22.712  SPELL_DAMAGE,a"));
    }

    #[test]
    fn test_line_endings_ignored() {
        let mut dedup = LineDeduplicator::new();
        assert!(dedup.accept(A));
        assert!(!dedup.accept(&format!("{A}\r\n")));
    }

    #[test]
    fn test_timestamp_prefix_shapes() {
        assert_eq!(timestamp_prefix(A), Some("5/21 21:28:22.712"));
        assert_eq!(
            timestamp_prefix("5/21/2024 21:28:22.7125-4  X,1"),
            Some("5/21/2024 21:28:22.7125-4")
        );
        assert_eq!(timestamp_prefix("5/21 21:28  X"), None);
        assert_eq!(timestamp_prefix("no separator"), None);
    }
}
