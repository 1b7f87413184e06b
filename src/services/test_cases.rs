/// Exact comparison after trimming leading/trailing whitespace on both
/// sides. Interior whitespace is significant.
pub(crate) fn case_passes(expected: &str, observed: &str) -> bool {
    expected.trim() == observed.trim()
}

pub(crate) fn summarize(passed: usize, total: usize) -> String {
    format!("{passed}/{total}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace_before_comparing() {
        assert!(case_passes("hello\n", "  hello  "));
        assert!(case_passes("42", "42\n"));
    }

    #[test]
    fn interior_whitespace_is_significant() {
        assert!(!case_passes("a b", "a  b"));
    }

    #[test]
    fn mismatch_fails() {
        assert!(!case_passes("expected", "observed"));
    }

    #[test]
    fn summary_uses_passed_over_total() {
        assert_eq!(summarize(2, 3), "2/3");
        assert_eq!(summarize(0, 0), "0/0");
    }
}
