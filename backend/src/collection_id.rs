use lazy_static::lazy_static;
use regex::Regex;

use crate::types::CollectionId;

lazy_static! {
    // Spaces, hyphens, underscores and apostrophes carry no meaning in book names.
    static ref RE_NAME_NOISE: Regex = Regex::new(r"[\s\-_']").unwrap();
}

/// One entry of the ordered matching table: the collection matches when the
/// normalized name contains any of the tokens.
pub struct CollectionRule {
    pub id: CollectionId,
    /// File stem used for export and summary file names.
    pub book_name: &'static str,
    pub tokens: &'static [&'static str],
}

impl CollectionRule {
    pub fn matches(&self, normalized_name: &str) -> bool {
        self.tokens.iter().any(|t| normalized_name.contains(t))
    }
}

/// Evaluated top to bottom, first match wins. Several collections share
/// ambiguous tokens, so the order must not change.
pub const COLLECTION_RULES: &[CollectionRule] = &[
    CollectionRule {
        id: CollectionId(1),
        book_name: "bukhari",
        tokens: &["bukhari"],
    },
    CollectionRule {
        id: CollectionId(2),
        book_name: "muslim",
        tokens: &["muslim"],
    },
    CollectionRule {
        id: CollectionId(3),
        book_name: "abudawud",
        tokens: &["abudawud", "abidaud", "abidawood"],
    },
    CollectionRule {
        id: CollectionId(4),
        book_name: "tirmidhi",
        tokens: &["tirmidhi", "tirmidzi"],
    },
    CollectionRule {
        id: CollectionId(5),
        book_name: "nasai",
        tokens: &["nasai", "annasai"],
    },
    CollectionRule {
        id: CollectionId(6),
        book_name: "ibnmajah",
        tokens: &["ibnmajah", "ibnumajah", "ibnmajh"],
    },
    CollectionRule {
        id: CollectionId(10),
        book_name: "riyadussalihin",
        tokens: &["riyad", "riyadus", "riyadh", "riyadussalihin"],
    },
    CollectionRule {
        id: CollectionId(11),
        book_name: "nawawi40",
        tokens: &["nawawi40", "arbain", "nawawi", "arbainannawawi"],
    },
];

/// "Sunan Abi Dawud" to "sunanabidawud"
pub fn normalize_collection_name(name: &str) -> String {
    RE_NAME_NOISE.replace_all(&name.to_lowercase(), "").into_owned()
}

/// Resolves a file name fragment or declared book name to its collection.
/// Returns `None` for unknown names; callers skip and warn.
pub fn resolve_collection_id(name: &str) -> Option<CollectionId> {
    let normalized = normalize_collection_name(name);
    COLLECTION_RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| rule.id)
}

pub fn canonical_book_name(id: CollectionId) -> Option<&'static str> {
    COLLECTION_RULES
        .iter()
        .find(|rule| rule.id == id)
        .map(|rule| rule.book_name)
}
