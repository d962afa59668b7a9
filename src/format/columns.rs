//! Column layout for inline option lines, shared by the screen and docx renderers.

/// Options longer than this get a line each.
pub const SINGLE_COLUMN_ABOVE: usize = 35;
/// Options longer than this (and not above `SINGLE_COLUMN_ABOVE`) go two per row.
pub const TWO_COLUMNS_ABOVE: usize = 18;

/// 1, 2 or 4 columns from the longest option's character length.
pub fn column_count(max_len: usize) -> usize {
    if max_len > SINGLE_COLUMN_ABOVE {
        1
    } else if max_len > TWO_COLUMNS_ABOVE {
        2
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::column_count;

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(column_count(0), 4);
        assert_eq!(column_count(18), 4);
        assert_eq!(column_count(19), 2);
        assert_eq!(column_count(35), 2);
        assert_eq!(column_count(36), 1);
    }
}
