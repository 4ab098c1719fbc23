//! Fixed-width line layout.
//!
//! Inputs are already charset-encoded, so one byte is one printed column.

/// Fill byte for separator lines.
pub const RULE_CHAR: u8 = b'-';

/// A separator `columns` wide.
pub fn rule(columns: usize) -> Vec<u8> {
    vec![RULE_CHAR; columns]
}

/// Lay out `left` flush left and `right` flush right within `columns`.
///
/// When both fit, the gap is filled with spaces so the line is exactly
/// `columns` wide. Otherwise trailing bytes of `left` are dropped; `right`
/// is never shortened, even if it alone exceeds the width.
pub fn two_column(left: &[u8], right: &[u8], columns: usize) -> Vec<u8> {
    let room = columns.saturating_sub(right.len());
    let left = &left[..left.len().min(room)];
    let gap = room - left.len();

    let mut line = Vec::with_capacity(left.len() + gap + right.len());
    line.extend_from_slice(left);
    line.resize(left.len() + gap, b' ');
    line.extend_from_slice(right);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule() {
        assert_eq!(rule(4), b"----");
        assert!(rule(0).is_empty());
    }

    #[test]
    fn test_two_column_pads_to_width() {
        let line = two_column(b"A", b"B", 32);
        assert_eq!(line.len(), 32);
        assert_eq!(line[0], b'A');
        assert_eq!(line[31], b'B');
        assert!(line[1..31].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_two_column_exact_fit_has_no_gap() {
        assert_eq!(two_column(b"abc", b"de", 5), b"abcde");
    }

    #[test]
    fn test_two_column_truncates_left_only() {
        assert_eq!(two_column(b"Long product name", b"$12.50", 12), b"Long p$12.50");
    }

    #[test]
    fn test_two_column_right_wider_than_line() {
        assert_eq!(two_column(b"left", b"0123456789", 8), b"0123456789");
    }

    #[test]
    fn test_two_column_empty_sides() {
        assert_eq!(two_column(b"", b"", 3), b"   ");
        assert_eq!(two_column(b"", b"x", 3), b"  x");
        assert_eq!(two_column(b"x", b"", 3), b"x  ");
    }
}
