//! Streaming prefix match over an ordered token sequence.
//!
//! Attempts are all-or-nothing: the first token that disagrees with the
//! expected sequence voids the whole attempt and empties the buffer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceProgress {
    /// Valid prefix so far, waiting for more tokens.
    Pending { entered: usize },
    /// The full sequence was entered in order.
    Solved,
    /// The token at position `at` was wrong.
    Failed { at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMatcher {
    expected: Vec<String>,
    input: Vec<String>,
}

impl SequenceMatcher {
    pub fn new(expected: Vec<String>) -> Self {
        Self {
            expected,
            input: Vec::new(),
        }
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn input(&self) -> &[String] {
        &self.input
    }

    pub fn reset(&mut self) {
        self.input.clear();
    }

    pub fn submit(&mut self, token: impl Into<String>) -> SequenceProgress {
        let token = token.into();
        let at = self.input.len();

        if self.expected.get(at) != Some(&token) {
            self.input.clear();
            return SequenceProgress::Failed { at };
        }

        self.input.push(token);
        if self.input.len() == self.expected.len() {
            self.input.clear();
            SequenceProgress::Solved
        } else {
            SequenceProgress::Pending {
                entered: self.input.len(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(tokens: &[&str]) -> SequenceMatcher {
        SequenceMatcher::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_exact_sequence_solves() {
        let mut m = matcher(&["1", "2", "3"]);
        assert_eq!(m.submit("1"), SequenceProgress::Pending { entered: 1 });
        assert_eq!(m.submit("2"), SequenceProgress::Pending { entered: 2 });
        assert_eq!(m.submit("3"), SequenceProgress::Solved);
        assert!(m.input().is_empty());
    }

    #[test]
    fn test_divergence_at_any_position_fails_and_clears() {
        let expected = ["1", "2", "3"];
        for k in 0..expected.len() {
            let mut m = matcher(&expected);
            for token in &expected[..k] {
                assert!(matches!(m.submit(*token), SequenceProgress::Pending { .. }));
            }
            assert_eq!(m.submit("9"), SequenceProgress::Failed { at: k });
            assert!(m.input().is_empty(), "buffer must be empty after failure at {k}");
        }
    }

    #[test]
    fn test_retry_after_failure_starts_from_scratch() {
        let mut m = matcher(&["A", "B"]);
        assert_eq!(m.submit("B"), SequenceProgress::Failed { at: 0 });
        assert_eq!(m.submit("A"), SequenceProgress::Pending { entered: 1 });
        assert_eq!(m.submit("B"), SequenceProgress::Solved);
    }

    #[test]
    fn test_multi_character_tokens_are_atomic() {
        let mut m = matcher(&["12", "3"]);
        assert_eq!(m.submit("1"), SequenceProgress::Failed { at: 0 });
        assert_eq!(m.submit("12"), SequenceProgress::Pending { entered: 1 });
    }

    #[test]
    fn test_empty_sequence_never_completes() {
        let mut m = matcher(&[]);
        assert_eq!(m.submit("1"), SequenceProgress::Failed { at: 0 });
    }
}
