//! Video title parsing
//!
//! Splits a free-text title such as `"Bach: Cello Suite No. 1"` into a
//! composer and a composition at the first separator character.

/// Characters that separate the composer from the composition in a title
pub const SEPARATORS: [char; 2] = [':', '-'];

/// Composer reported when a title has no separator
pub const UNKNOWN_COMPOSER: &str = "Unknown Composer";

/// Composition reported when a title has no separator
pub const UNKNOWN_COMPOSITION: &str = "Unknown Composition";

/// Composer/composition suggestion derived from a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub composer: String,
    pub composition: String,
}

impl ParsedTitle {
    fn unknown() -> Self {
        Self {
            composer: UNKNOWN_COMPOSER.to_string(),
            composition: UNKNOWN_COMPOSITION.to_string(),
        }
    }
}

/// Split `title` at the leftmost separator.
///
/// Both halves are trimmed. A separator at the very start yields an empty
/// composer; callers validate that before storing anything. Titles without a
/// separator map to the fixed unknown pair.
pub fn parse_title(title: &str) -> ParsedTitle {
    match title.char_indices().find(|(_, c)| SEPARATORS.contains(c)) {
        Some((index, separator)) => ParsedTitle {
            composer: title[..index].trim().to_string(),
            composition: title[index + separator.len_utf8()..].trim().to_string(),
        },
        None => ParsedTitle::unknown(),
    }
}
