/// Prefix of student national identifiers
pub const NATIONAL_ID_PREFIX: &str = "CNIEU";

const NATIONAL_ID_DIGITS: usize = 3;

/// Canonical form of a national id, or `None` when the input is not one.
///
/// `cnieu123` and `123` both become `CNIEU123`; anything else is absent.
pub fn normalize_national_id(raw: &str) -> Option<String> {
    let value = raw.trim().to_uppercase();
    let digits = value.strip_prefix(NATIONAL_ID_PREFIX).unwrap_or(&value);

    let well_formed = digits.len() == NATIONAL_ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit());
    well_formed.then(|| format!("{NATIONAL_ID_PREFIX}{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_input_is_uppercased() {
        assert_eq!(normalize_national_id("cnieu123").as_deref(), Some("CNIEU123"));
        assert_eq!(normalize_national_id("  CNIEU007 ").as_deref(), Some("CNIEU007"));
    }

    #[test]
    fn bare_digits_get_prefix() {
        assert_eq!(normalize_national_id("123").as_deref(), Some("CNIEU123"));
    }

    #[test]
    fn malformed_input_is_absent() {
        assert_eq!(normalize_national_id("CNIEU12"), None);
        assert_eq!(normalize_national_id(""), None);
        assert_eq!(normalize_national_id("   "), None);
        assert_eq!(normalize_national_id("CNIEU1234"), None);
        assert_eq!(normalize_national_id("12a"), None);
        assert_eq!(normalize_national_id("CNIEU"), None);
        assert_eq!(normalize_national_id("XCNIEU123"), None);
    }
}
