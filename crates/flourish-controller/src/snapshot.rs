//! Draft snapshots and fingerprinting.

/// Cheap equality proxy for draft content: length plus an order-sensitive
/// rolling checksum over UTF-16 code units.
///
/// Used to detect whether a draft changed between two points in time without
/// storing history. Not cryptographic; an undetected edit requires a
/// same-length checksum collision, which is an accepted risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub len: usize,
    pub checksum: i32,
}

impl Fingerprint {
    /// `h = (h << 5) - h + unit` with wrapping 32-bit arithmetic.
    pub fn of(text: &str) -> Self {
        let mut checksum: i32 = 0;
        let mut len = 0usize;
        for unit in text.encode_utf16() {
            len += 1;
            checksum = checksum
                .wrapping_shl(5)
                .wrapping_sub(checksum)
                .wrapping_add(i32::from(unit));
        }
        Self { len, checksum }
    }
}

/// Draft text captured at a point in time. Immutable once captured.
#[derive(Debug, Clone)]
pub struct DraftSnapshot {
    pub text: String,
    pub fingerprint: Fingerprint,
}

impl DraftSnapshot {
    pub fn capture(text: String) -> Self {
        let fingerprint = Fingerprint::of(&text);
        Self { text, fingerprint }
    }

    /// Whether the given text still matches this snapshot.
    pub fn matches(&self, text: &str) -> bool {
        Fingerprint::of(text) == self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fingerprint() {
        let fp = Fingerprint::of("");
        assert_eq!(fp.len, 0);
        assert_eq!(fp.checksum, 0);
    }

    #[test]
    fn test_known_values() {
        // 'a' = 97; h = 97. 'b': 97*31 + 98 = 3105.
        assert_eq!(Fingerprint::of("ab").checksum, 3105);
        assert_eq!(Fingerprint::of("ba").checksum, 3135);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(Fingerprint::of("ab"), Fingerprint::of("ba"));
    }

    #[test]
    fn test_utf16_length_counts_surrogate_pairs() {
        // "👀" is one char but two UTF-16 code units.
        assert_eq!(Fingerprint::of("hi👀").len, 4);
    }

    #[test]
    fn test_long_text_wraps_without_panic() {
        let text = "x".repeat(10_000);
        let fp = Fingerprint::of(&text);
        assert_eq!(fp.len, 10_000);
    }

    #[test]
    fn test_snapshot_matches() {
        let snapshot = DraftSnapshot::capture("hello world".to_string());
        assert!(snapshot.matches("hello world"));
        assert!(!snapshot.matches("hello worlD"));
        assert!(!snapshot.matches("hello world "));
    }

    #[test]
    fn test_same_length_different_content_detected() {
        let snapshot = DraftSnapshot::capture("abcd".to_string());
        assert!(!snapshot.matches("abdc"));
    }
}
