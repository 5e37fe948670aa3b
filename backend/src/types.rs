use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Canonical numeric id of a hadith collection, shared by every language row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub i32);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Arabic,
    English,
    Bahasa,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid Language value: {0}")]
pub struct ParseLanguageError(String);

impl Language {
    pub const ALL: [Language; 3] = [Language::Arabic, Language::English, Language::Bahasa];

    /// Name stored in the `language` columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::English => "english",
            Language::Bahasa => "bahasa",
        }
    }

    /// Three-letter file name prefix, e.g. `eng` in `eng-bukhari.json`.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Language::Arabic => "ara",
            Language::English => "eng",
            Language::Bahasa => "ind",
        }
    }

    /// Detects the language from the `ara-`, `eng-` or `ind-` file name prefix.
    pub fn from_file_name(file_name: &str) -> Option<Language> {
        Language::ALL
            .into_iter()
            .find(|lang| file_name.starts_with(&format!("{}-", lang.file_prefix())))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arabic" => Ok(Language::Arabic),
            "english" => Ok(Language::English),
            "bahasa" => Ok(Language::Bahasa),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

/// Opaque section identity. Top-level ids come from the source documents,
/// subsection ids are `<parentId>-<fileIndex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub const SEPARATOR: char = '-';

    pub fn new(id: impl Into<String>) -> Self {
        SectionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Composite id of a subsection attached to this section.
    pub fn child(&self, file_index: &FileIndex) -> SectionId {
        SectionId(format!("{}{}{}", self.0, Self::SEPARATOR, file_index.as_str()))
    }

    /// Recovers the `fileIndex` token of a subsection id by splitting on the
    /// last separator. Ids without a separator yield `"0"`.
    pub fn file_index(&self) -> FileIndex {
        match self.0.rsplit_once(Self::SEPARATOR) {
            Some((_, token)) => FileIndex::new(token),
            None => FileIndex::new("0"),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId::new(s)
    }
}

/// Token from a subsection descriptor file. Accepted as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIndex(String);

impl FileIndex {
    pub fn new(token: impl Into<String>) -> Self {
        FileIndex(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_plain_integer(&self) -> bool {
        let s = self.0.as_str();
        !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'))
    }
}

impl fmt::Display for FileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FileIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_plain_integer() {
            if let Ok(n) = self.0.parse::<u64>() {
                return serializer.serialize_u64(n);
            }
        }
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FileIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FileIndexVisitor;

        impl Visitor<'_> for FileIndexVisitor {
            type Value = FileIndex;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or number file index")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FileIndex, E> {
                Ok(FileIndex::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FileIndex, E> {
                Ok(FileIndex::new(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FileIndex, E> {
                Ok(FileIndex::new(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FileIndex, E> {
                Ok(FileIndex::new(HadithNumber(v).to_string()))
            }
        }

        deserializer.deserialize_any(FileIndexVisitor)
    }
}

/// A record number (`hadithnumber`, `arabicnumber` and the section bounds).
///
/// Stored as `REAL` so that numbers like `12.1` survive. Whole numbers are
/// written back to JSON as integers, and `Display` gives the same form, which
/// is also the key used to match summaries to records.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HadithNumber(pub f64);

impl HadithNumber {
    pub fn value(&self) -> f64 {
        self.0
    }

    fn as_whole(&self) -> Option<i64> {
        // 2^53, the largest range where every integer is exact in f64
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT {
            Some(self.0 as i64)
        } else {
            None
        }
    }

    /// Parses a number from a JSON value; numeric strings are accepted.
    pub fn from_json(value: &serde_json::Value) -> Option<HadithNumber> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(HadithNumber),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(HadithNumber),
            _ => None,
        }
    }
}

impl From<f64> for HadithNumber {
    fn from(v: f64) -> Self {
        HadithNumber(v)
    }
}

impl fmt::Display for HadithNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for HadithNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for HadithNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        HadithNumber::from_json(&value)
            .ok_or_else(|| de::Error::custom(format!("not a hadith number: {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_file_name() {
        assert_eq!(Language::from_file_name("ara-bukhari.json"), Some(Language::Arabic));
        assert_eq!(Language::from_file_name("eng-muslim-subsection.json"), Some(Language::English));
        assert_eq!(Language::from_file_name("ind-nawawi40.json"), Some(Language::Bahasa));
        assert_eq!(Language::from_file_name("fra-bukhari.json"), None);
        assert_eq!(Language::from_file_name("engbukhari.json"), None);
    }

    #[test]
    fn test_language_round_trip_str() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>(), Ok(lang));
        }
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_section_id_child_and_file_index() {
        let parent = SectionId::new("12");
        let child = parent.child(&FileIndex::new("3"));
        assert_eq!(child.as_str(), "12-3");
        assert_eq!(child.file_index().as_str(), "3");

        // Only the last separator is significant.
        let nested = SectionId::new("4-a-17");
        assert_eq!(nested.file_index().as_str(), "17");

        assert_eq!(SectionId::new("7").file_index().as_str(), "0");
    }

    #[test]
    fn test_file_index_json() {
        let from_num: FileIndex = serde_json::from_str("5").unwrap();
        let from_str: FileIndex = serde_json::from_str("\"05\"").unwrap();
        assert_eq!(from_num.as_str(), "5");
        assert_eq!(from_str.as_str(), "05");

        assert_eq!(serde_json::to_string(&from_num).unwrap(), "5");
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"05\"");
        assert_eq!(serde_json::to_string(&FileIndex::new("b")).unwrap(), "\"b\"");
    }

    #[test]
    fn test_hadith_number_json() {
        let whole: HadithNumber = serde_json::from_str("42").unwrap();
        let frac: HadithNumber = serde_json::from_str("42.5").unwrap();
        let text: HadithNumber = serde_json::from_str("\"7\"").unwrap();

        assert_eq!(serde_json::to_string(&whole).unwrap(), "42");
        assert_eq!(serde_json::to_string(&frac).unwrap(), "42.5");
        assert_eq!(text.value(), 7.0);

        assert_eq!(whole.to_string(), "42");
        assert_eq!(frac.to_string(), "42.5");

        assert!(serde_json::from_str::<HadithNumber>("\"abc\"").is_err());
    }
}
