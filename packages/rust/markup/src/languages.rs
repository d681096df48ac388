//! Source-language code normalization.

/// Short codes mapped to canonical root-language names. Codes not listed here
/// are kept as-is.
pub const ROOT_LANGUAGES: &[(&str, &str)] = &[
    ("la", "latin"),
    ("grc", "greek"),
    ("ang", "old_english"),
    ("non", "old_norse"),
    ("goh", "old_high_german"),
    ("odt", "old_dutch"),
    ("fro", "old_french"),
    ("gem-pro", "proto_germanic"),
    ("ar", "arabic"),
    ("fa", "persian"),
    ("sa", "sanskrit"),
    ("hi", "hindi"),
    ("ta", "tamil"),
    ("zh", "chinese"),
    ("ja", "japanese"),
    ("ko", "korean"),
    ("nl", "dutch"),
    ("de", "german"),
    ("fr", "french"),
    ("es", "spanish"),
    ("it", "italian"),
    ("pt", "portuguese"),
];

/// Canonical name for a lower-cased language code.
pub fn canonical_language(code: &str) -> &str {
    ROOT_LANGUAGES
        .iter()
        .find(|(short, _)| *short == code)
        .map_or(code, |(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_named() {
        assert_eq!(canonical_language("la"), "latin");
        assert_eq!(canonical_language("ang"), "old_english");
        assert_eq!(canonical_language("gem-pro"), "proto_germanic");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(canonical_language("enm"), "enm");
        assert_eq!(canonical_language("xno"), "xno");
    }
}
