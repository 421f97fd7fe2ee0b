//! Case-insensitive filename and type-tag matching helpers.

/// Case-insensitive substring test.
///
/// Legacy type markers are matched loosely: any resource whose type or
/// identifier contains the marker, in any case, counts as a match.
///
/// ```
/// use bax2bam::utils::text::contains_ignore_case;
///
/// assert!(contains_ignore_case("PacBio.SubreadFile.BaxFile", "bax"));
/// assert!(contains_ignore_case("/data/m1.1.BAX.H5", ".bax.h5"));
/// assert!(!contains_ignore_case("PacBio.SubreadFile.SubreadBamFile", "bax"));
/// ```
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive suffix test.
#[must_use]
pub fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    haystack.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Strip a suffix ignoring case, returning the remaining prefix.
#[must_use]
pub fn strip_suffix_ignore_case<'a>(haystack: &'a str, suffix: &str) -> Option<&'a str> {
    if haystack.len() < suffix.len() || !haystack.is_char_boundary(haystack.len() - suffix.len())
    {
        return None;
    }
    let (head, tail) = haystack.split_at(haystack.len() - suffix.len());
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_with_ignore_case() {
        assert!(ends_with_ignore_case("m1.bas.h5", ".bas.h5"));
        assert!(ends_with_ignore_case("M1.BAS.H5", ".bas.h5"));
        assert!(!ends_with_ignore_case("m1.bas.h5.bak", ".bas.h5"));
    }

    #[test]
    fn test_strip_suffix_ignore_case() {
        assert_eq!(strip_suffix_ignore_case("m1.1.Bax.H5", ".bax.h5"), Some("m1.1"));
        assert_eq!(strip_suffix_ignore_case("h5", ".bax.h5"), None);
        assert_eq!(strip_suffix_ignore_case("m1.bam", ".bax.h5"), None);
    }
}
