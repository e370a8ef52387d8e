// Column width estimation, in 1/256ths of a character

/// Width units per character.
pub const CHAR_UNITS: u32 = 256;
/// Excel caps a column at 255 characters.
pub const MAX_COLUMN_UNITS: u32 = 255 * CHAR_UNITS;
/// Width of a column nobody has sized (8 characters).
pub const DEFAULT_COLUMN_UNITS: u32 = 8 * CHAR_UNITS;
/// Room left for the auto-filter dropdown button.
pub const DEFAULT_FILTER_BUTTON_PADDING: u32 = 1500;

/// Approximate rendered width of `s` in characters.
///
/// Wide (non-ASCII) glyphs count for 1.6 characters, which tracks CJK text in
/// the default Calibri font closely enough for sizing.
pub fn display_chars(s: &str) -> usize {
    let n_ascii = s.chars().filter(|c| c.is_ascii()).count();
    let n_wide = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_wide as f64 * 1.6).round() as usize
}

/// Auto-size width for a column holding `texts`, `None` when it holds nothing.
pub fn fit_units<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<u32> {
    let widest = texts.into_iter().map(display_chars).max()?;
    // one extra character for cell margins
    let units = (widest as u64 + 1) * CHAR_UNITS as u64;
    Some(units.min(MAX_COLUMN_UNITS as u64) as u32)
}

/// Convert width units to the character width Excel stores.
pub fn units_to_chars(units: u32) -> f64 {
    units as f64 / CHAR_UNITS as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_chars() {
        assert_eq!(display_chars(""), 0);
        assert_eq!(display_chars("Food"), 4);
        assert_eq!(display_chars("食品"), 3);
    }

    #[test]
    fn test_fit_units() {
        assert_eq!(fit_units(Vec::<&str>::new()), None);
        assert_eq!(fit_units(["ab", "abcd", ""]), Some(5 * 256));
        let huge = "x".repeat(400);
        assert_eq!(fit_units([huge.as_str()]), Some(MAX_COLUMN_UNITS));
    }

    #[test]
    fn test_units_to_chars() {
        assert!((units_to_chars(DEFAULT_COLUMN_UNITS) - 8.0).abs() < f64::EPSILON);
        assert!((units_to_chars(1500) - 5.859375).abs() < 1e-9);
    }
}
