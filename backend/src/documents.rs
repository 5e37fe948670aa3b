//! Serde models of the JSON documents the corpus is exchanged in.
//!
//! - hadith documents, either a flat list of [`HadithEntry`] or a
//!   [`HadithDocument`] with a `metadata` block
//! - subsection descriptor files (`subsection/<lng>-<book>-subsection.json`)
//! - summary files (`summarized/<lng>-<book>-summarized.json`)
//! - collection info files (`<lng>-collections.json`)

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{FileIndex, HadithNumber, SectionId};

/// Family key the collection info export is written under.
pub static DEFAULT_COLLECTION_FAMILY: &str = "kutub_al_sittah";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HadithEntry {
    #[serde(default)]
    pub hadithnumber: Option<HadithNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabicnumber: Option<HadithNumber>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grades: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tldr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
}

/// A `"text": null` record is kept with an empty body.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    #[serde(default)]
    pub hadithnumber_first: Option<HadithNumber>,
    #[serde(default)]
    pub hadithnumber_last: Option<HadithNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabicnumber_first: Option<HadithNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabicnumber_last: Option<HadithNumber>,
}

/// `sections` and `section_details` keep document order on import, which
/// becomes the row insertion order of the top-level sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub sections: IndexMap<SectionId, Option<String>>,
    #[serde(default)]
    pub section_details: IndexMap<SectionId, SectionBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HadithDocument {
    #[serde(alias = "records")]
    pub hadiths: Vec<HadithEntry>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionDescriptor {
    #[serde(default)]
    pub file_index: Option<FileIndex>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub hadith_number_first: Option<HadithNumber>,
    #[serde(default)]
    pub hadith_number_last: Option<HadithNumber>,
}

/// Summary entry as read. The record is named by `hadithnumber`, or by `id`
/// when `hadithnumber` is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryEntry {
    #[serde(default)]
    pub hadithnumber: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl SummaryEntry {
    /// The string key records are matched on, e.g. `"12"` for `12` or `"12"`.
    pub fn record_key(&self) -> Option<String> {
        let value = match &self.hadithnumber {
            Some(v) if !v.is_null() => v,
            _ => self.id.as_ref()?,
        };
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(_) => HadithNumber::from_json(value).map(|n| n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryExport {
    pub hadithnumber: Option<HadithNumber>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub book_name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hadith_count: Option<i64>,
}

/// `{<family>: [CollectionInfo, ...]}`
pub type CollectionInfoDocument = IndexMap<String, Vec<CollectionInfo>>;
