//! Accept-Language negotiation.
//!
//! Entries are scanned in header order and the first one whose primary
//! subtag is a supported language wins. Quality values are ignored.

use super::Locale;

/// Primary subtags checked against each entry, in priority order.
const PRIORITY: [Locale; 3] = [Locale::Sr, Locale::Hu, Locale::En];

/// Pick a locale from an Accept-Language header value.
pub fn negotiate(header: &str) -> Option<Locale> {
    header
        .split(',')
        .filter_map(|entry| entry.split(';').next())
        .map(|tag| tag.trim().to_ascii_lowercase())
        .find_map(|tag| {
            let primary = tag.split(['-', '_']).next()?;
            PRIORITY.into_iter().find(|l| l.as_str() == primary)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_supported_entry_wins() {
        assert_eq!(negotiate("sr-RS,en;q=0.5"), Some(Locale::Sr));
        assert_eq!(negotiate("de-DE, hu;q=0.9, en;q=0.8"), Some(Locale::Hu));
        assert_eq!(negotiate("EN-gb"), Some(Locale::En));
    }

    #[test]
    fn test_quality_ignored() {
        assert_eq!(negotiate("en;q=0.1, sr;q=1.0"), Some(Locale::En));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(negotiate(""), None);
        assert_eq!(negotiate("*"), None);
        assert_eq!(negotiate("de, fr;q=0.5"), None);
        assert_eq!(negotiate("srd"), None);
    }
}
