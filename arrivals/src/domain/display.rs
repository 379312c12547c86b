//! Text clean-up for the LED board and platform filtering.

/// Characters the London Underground LED font can render, besides ASCII
/// letters and digits.
const LED_PUNCTUATION: &[char] = &[' ', '-', '\'', '&', '*', '+', ':', ',', '.'];

const PLATFORM_PREFIX: &str = "platform ";

/// Reduce text to what the LED font can draw.
///
/// Curly apostrophes and en/em dashes are first normalised to their ASCII
/// forms so they survive; everything else outside the font is dropped.
///
/// # Examples
///
/// ```
/// use arrivals::domain::filter_led_chars;
///
/// assert_eq!(filter_led_chars("King\u{2018}s Cross"), "King's Cross");
/// assert_eq!(filter_led_chars("Kensington (Olympia)"), "Kensington Olympia");
/// ```
pub fn filter_led_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .filter(|c| c.is_ascii_alphanumeric() || LED_PUNCTUATION.contains(c))
        .collect()
}

/// Strip a leading "Platform " (any case) and surrounding whitespace.
pub fn sanitize_platform(input: &str) -> &str {
    match input.get(..PLATFORM_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PLATFORM_PREFIX) => {
            input[PLATFORM_PREFIX.len()..].trim()
        }
        _ => input.trim(),
    }
}

/// Whether a platform name satisfies a platform filter.
///
/// Both sides are sanitised and compared case-insensitively. The filter
/// must occur at a word start (not preceded by a letter or digit) and must
/// not run on into further digits. So "2" matches "2", "2A" and
/// "Westbound - Platform 2", but never "12" or "21". An empty filter
/// matches everything.
pub fn platform_matches(platform: &str, filter: &str) -> bool {
    let filter = sanitize_platform(filter).to_lowercase();
    if filter.is_empty() {
        return true;
    }
    let platform = sanitize_platform(platform).to_lowercase();

    platform.match_indices(filter.as_str()).any(|(start, _)| {
        let before = platform[..start].chars().next_back();
        let after = platform[start + filter.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_supported_characters() {
        assert_eq!(filter_led_chars("ABCxyz"), "ABCxyz");
        assert_eq!(filter_led_chars("123"), "123");
        assert_eq!(filter_led_chars("-'&*+:,."), "-'&*+:,.");
        assert_eq!(filter_led_chars("Clapham Junction"), "Clapham Junction");
    }

    #[test]
    fn removes_unsupported_characters() {
        assert_eq!(filter_led_chars("Kensington (Olympia)"), "Kensington Olympia");
        assert_eq!(
            filter_led_chars("Queenstown Road [Battersea]"),
            "Queenstown Road Battersea"
        );
        assert_eq!(filter_led_chars("Zürich"), "Zrich");
    }

    #[test]
    fn normalises_curly_apostrophes() {
        assert_eq!(filter_led_chars("King\u{2018}s Cross"), "King's Cross");
        assert_eq!(filter_led_chars("Shepherd\u{2019}s Bush"), "Shepherd's Bush");
    }

    #[test]
    fn normalises_dashes() {
        assert_eq!(filter_led_chars("Times Square\u{2013}42 St"), "Times Square-42 St");
        assert_eq!(filter_led_chars("Times Square\u{2014}42 St"), "Times Square-42 St");
    }

    #[test]
    fn handles_empty_string() {
        assert_eq!(filter_led_chars(""), "");
    }

    #[test]
    fn sanitize_strips_prefix() {
        assert_eq!(sanitize_platform("Platform 2"), "2");
        assert_eq!(sanitize_platform("platform 2A "), "2A");
        assert_eq!(sanitize_platform("PLATFORM  3"), "3");
        assert_eq!(sanitize_platform(" 4 "), "4");
        assert_eq!(sanitize_platform("Platforms"), "Platforms");
        assert_eq!(sanitize_platform(""), "");
    }

    #[test]
    fn empty_filter_matches_all() {
        assert!(platform_matches("2", ""));
        assert!(platform_matches("", ""));
        assert!(platform_matches("Platform 9", "  "));
    }

    #[test]
    fn filter_matches_exact_number() {
        assert!(platform_matches("21", "21"));
        assert!(!platform_matches("2", "21"));
        assert!(!platform_matches("12", "21"));
    }

    #[test]
    fn filter_does_not_match_longer_numbers() {
        assert!(platform_matches("1", "1"));
        assert!(!platform_matches("10", "1"));
        assert!(!platform_matches("11", "1"));
        assert!(!platform_matches("12", "2"));
    }

    #[test]
    fn filter_matches_letter_suffix() {
        assert!(platform_matches("2", "2"));
        assert!(platform_matches("2A", "2"));
        assert!(platform_matches("2B", "2"));
        assert!(platform_matches("2a", "2A"));
        assert!(!platform_matches("2B", "2A"));
    }

    #[test]
    fn filter_accepts_platform_prefix_on_either_side() {
        assert!(platform_matches("Platform 2", "2"));
        assert!(platform_matches("2", "Platform 2"));
        assert!(!platform_matches("Platform 12", "2"));
    }

    #[test]
    fn filter_matches_within_tube_platform_names() {
        assert!(platform_matches("Westbound - Platform 2", "2"));
        assert!(!platform_matches("Westbound - Platform 12", "2"));
        assert!(platform_matches("Westbound - Platform 2", "westbound"));
        assert!(!platform_matches("Westbound - Platform 2", "bound"));
    }

    #[test]
    fn missing_platform_never_matches_filter() {
        assert!(!platform_matches("", "2"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Filtering its own output changes nothing.
        #[test]
        fn led_filter_is_idempotent(s in "\\PC*") {
            let once = filter_led_chars(&s);
            prop_assert_eq!(filter_led_chars(&once), once.clone());
        }

        /// Output only contains characters the font can draw.
        #[test]
        fn led_filter_output_is_supported(s in "\\PC*") {
            let out = filter_led_chars(&s);
            prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || LED_PUNCTUATION.contains(&c)));
        }

        /// A platform always satisfies a filter equal to itself.
        #[test]
        fn platform_matches_itself(p in "[0-9]{1,2}[A-D]?") {
            prop_assert!(platform_matches(&p, &p));
        }
    }
}
