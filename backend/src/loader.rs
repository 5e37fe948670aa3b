use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use walkdir::WalkDir;

use crate::collection_id::{canonical_book_name, resolve_collection_id};
use crate::db::corpus_models::{NewCollection, NewRecord, NewSection};
use crate::documents::*;
use crate::errors::CorpusError;
use crate::logger;
use crate::types::{CollectionId, Language, SectionId};
use crate::SUMMARY_DIR_NAME;

/// Record key (see [`SummaryEntry::record_key`]) to summary text.
pub type SummaryMap = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// A bare list of records.
    Flat,
    /// `{hadiths: [...], metadata: {sections, section_details}}`
    WithMetadata,
}

/// What a JSON file in the corpus directory holds, judged by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusFileKind {
    CollectionInfo(Language),
    HadithData(Language),
    Subsection(Language),
    /// Summary side-file kept next to the documents; read by the loader, not imported.
    Summary(Language),
    Unrecognized,
}

/// `eng-collections.json`, `eng-bukhari.json`, `eng-bukhari-subsection.json`,
/// `eng-bukhari-summarized.json`
pub fn classify_file_name(file_name: &str) -> CorpusFileKind {
    let Some(lang) = Language::from_file_name(file_name) else {
        return CorpusFileKind::Unrecognized;
    };
    if !file_name.ends_with(".json") {
        CorpusFileKind::Unrecognized
    } else if file_name == format!("{}-collections.json", lang.file_prefix()) {
        CorpusFileKind::CollectionInfo(lang)
    } else if file_name.ends_with("-subsection.json") {
        CorpusFileKind::Subsection(lang)
    } else if file_name.ends_with("-summarized.json") {
        CorpusFileKind::Summary(lang)
    } else {
        CorpusFileKind::HadithData(lang)
    }
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn discover_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();

    files.sort();
    Ok(files)
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    Ok(value)
}

/// A hadith data file, parsed and ready for insertion.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub collection_id: CollectionId,
    pub language: Language,
    pub shape: DocumentShape,
    pub hadiths: Vec<HadithEntry>,
    pub metadata: DocumentMetadata,
    pub summaries: SummaryMap,
    pub summary_source: Option<PathBuf>,
}

/// Accepts both document shapes; the shape is inferred from the JSON root.
pub fn parse_hadith_document(
    path: &Path,
    root: Value,
) -> Result<(DocumentShape, Vec<HadithEntry>, DocumentMetadata), CorpusError> {
    match root {
        Value::Array(_) => {
            let hadiths: Vec<HadithEntry> = serde_json::from_value(root)
                .map_err(|e| CorpusError::malformed(path, e.to_string()))?;
            Ok((DocumentShape::Flat, hadiths, DocumentMetadata::default()))
        }
        Value::Object(_) => {
            let doc: HadithDocument = serde_json::from_value(root)
                .map_err(|e| CorpusError::malformed(path, e.to_string()))?;
            Ok((DocumentShape::WithMetadata, doc.hadiths, doc.metadata))
        }
        _ => Err(CorpusError::malformed(path, "root is neither a list nor an object")),
    }
}

pub fn load_hadith_document(path: &Path, language: Language, corpus_dir: &Path) -> Result<LoadedDocument> {
    let file_name = file_name_of(path);
    let collection_id = resolve_collection_id(&file_name)
        .ok_or_else(|| CorpusError::UnresolvedCollection(file_name.clone()))?;

    let root: Value = read_json_file(path)?;
    let (shape, hadiths, metadata) = parse_hadith_document(path, root)?;

    let (summary_source, summaries) = match load_summaries(corpus_dir, collection_id, language) {
        Some((p, m)) => (Some(p), m),
        None => (None, SummaryMap::new()),
    };

    Ok(LoadedDocument {
        path: path.to_path_buf(),
        collection_id,
        language,
        shape,
        hadiths,
        metadata,
        summaries,
        summary_source,
    })
}

/// Summary file locations for a (collection, language), in lookup order.
pub fn summary_candidates(corpus_dir: &Path, collection_id: CollectionId, language: Language) -> Vec<PathBuf> {
    let Some(book_name) = canonical_book_name(collection_id) else {
        return Vec::new();
    };
    let prefix = language.file_prefix();

    vec![
        corpus_dir.join(SUMMARY_DIR_NAME).join(format!("{}-{}-summarized.json", prefix, book_name)),
        corpus_dir.join(SUMMARY_DIR_NAME).join(format!("{}-{}.json", prefix, book_name)),
        corpus_dir.join(format!("{}-{}-summarized.json", prefix, book_name)),
    ]
}

/// Loads the first summary file that exists. Only that one file is consulted;
/// when it cannot be parsed the records get no summaries.
pub fn load_summaries(
    corpus_dir: &Path,
    collection_id: CollectionId,
    language: Language,
) -> Option<(PathBuf, SummaryMap)> {
    let path = summary_candidates(corpus_dir, collection_id, language)
        .into_iter()
        .find(|p| p.is_file())?;

    let entries: Vec<SummaryEntry> = match read_json_file(&path) {
        Ok(x) => x,
        Err(e) => {
            logger::warn(&format!("Error loading summaries from {}: {:#}", path.display(), e));
            return None;
        }
    };

    let summaries: SummaryMap = entries
        .into_iter()
        .filter_map(|entry| {
            let key = entry.record_key()?;
            let summary = entry.summary.filter(|s| !s.is_empty())?;
            Some((key, summary))
        })
        .collect();

    logger::info(&format!("Loaded {} summaries from {}", summaries.len(), path.display()));
    Some((path, summaries))
}

fn to_json_text(value: &Option<Value>) -> Result<Option<String>, serde_json::Error> {
    match value {
        Some(v) if !v.is_null() => serde_json::to_string(v).map(Some),
        _ => Ok(None),
    }
}

impl LoadedDocument {
    /// Record rows; structured side-fields become JSON text, absent ones NULL.
    pub fn new_records(&self) -> Result<Vec<NewRecord>> {
        self.hadiths
            .iter()
            .map(|h| -> Result<NewRecord> {
                let summary = h.hadithnumber
                    .and_then(|n| self.summaries.get(&n.to_string()))
                    .cloned();

                Ok(NewRecord {
                    collection_id: self.collection_id.0,
                    id: h.hadithnumber.map(|n| n.value()),
                    arabic_number: h.arabicnumber.map(|n| n.value()),
                    text: h.text.clone(),
                    language: self.language.as_str().to_string(),
                    grades: to_json_text(&h.grades)?,
                    reference: to_json_text(&h.reference)?,
                    narration: to_json_text(&h.narration)?,
                    tldr: h.tldr.clone(),
                    narrator: h.narrator.clone(),
                    summary,
                })
            })
            .collect()
    }

    /// Top-level section rows in document order. Sections without an entry in
    /// `section_details` get no bounds.
    pub fn new_sections(&self) -> Vec<NewSection<'_>> {
        let lang = self.language.as_str();
        self.metadata
            .sections
            .iter()
            .map(|(section_id, title)| {
                let bounds = self.metadata.section_details.get(section_id);
                NewSection {
                    collection_id: self.collection_id.0,
                    section_id: section_id.as_str(),
                    language: lang,
                    section_title: title.as_deref(),
                    hadith_number_first: bounds.and_then(|b| b.hadithnumber_first).map(|n| n.value()),
                    hadith_number_last: bounds.and_then(|b| b.hadithnumber_last).map(|n| n.value()),
                    arabic_number_first: bounds.and_then(|b| b.arabicnumber_first).map(|n| n.value()),
                    arabic_number_last: bounds.and_then(|b| b.arabicnumber_last).map(|n| n.value()),
                    parent_section_id: None,
                }
            })
            .collect()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> {
        self.metadata.sections.keys()
    }
}

/// A collection info file resolved to rows. Entries whose `book_name` matches
/// no collection are returned separately so the caller can warn about them.
pub struct LoadedCollectionInfo {
    pub language: Language,
    pub collections: Vec<(CollectionId, CollectionInfo)>,
    pub unresolved: Vec<String>,
}

pub fn load_collection_info(path: &Path, language: Language) -> Result<LoadedCollectionInfo> {
    let root: Value = read_json_file(path)?;
    if !root.is_object() {
        return Err(CorpusError::malformed(path, "collection info root must be an object").into());
    }
    let doc: CollectionInfoDocument = serde_json::from_value(root)
        .map_err(|e| CorpusError::malformed(path, e.to_string()))?;

    let mut collections = Vec::new();
    let mut unresolved = Vec::new();

    for info in doc.into_values().flatten() {
        let name = info.book_name.clone().unwrap_or_default();
        match resolve_collection_id(&name) {
            Some(id) => collections.push((id, info)),
            None => unresolved.push(name),
        }
    }

    Ok(LoadedCollectionInfo { language, collections, unresolved })
}

impl LoadedCollectionInfo {
    pub fn new_collections(&self) -> Vec<NewCollection<'_>> {
        self.collections
            .iter()
            .map(|(id, info)| NewCollection {
                id: id.0,
                language: self.language.as_str(),
                title: info.book_name.as_deref(),
                author: info.author.as_deref(),
                real_name: info.real_name.as_deref(),
                description: info.description.as_deref(),
                hadith_count: info.hadith_count,
            })
            .collect()
    }
}

/// Subsection descriptors of one (collection, language) scope.
#[derive(Debug, Clone)]
pub struct SubsectionFile {
    pub path: PathBuf,
    pub collection_id: CollectionId,
    pub language: Language,
    pub descriptors: Vec<SubsectionDescriptor>,
}

/// The scope comes from the file name, e.g. `eng-bukhari-subsection.json`.
pub fn load_subsection_file(path: &Path) -> Result<SubsectionFile> {
    let file_name = file_name_of(path);
    let stem = file_name.replace("-subsection.json", ".json");

    let collection_id = resolve_collection_id(&file_name)
        .or_else(|| resolve_collection_id(&stem))
        .ok_or_else(|| CorpusError::UnresolvedCollection(file_name.clone()))?;

    let language = Language::from_file_name(&file_name)
        .ok_or_else(|| CorpusError::UnknownLanguage(file_name.clone()))?;

    let root: Value = read_json_file(path)?;
    if !root.is_array() {
        return Err(CorpusError::malformed(path, "subsection file root must be a list").into());
    }
    let descriptors: Vec<SubsectionDescriptor> = serde_json::from_value(root)
        .map_err(|e| CorpusError::malformed(path, e.to_string()))?;

    Ok(SubsectionFile {
        path: path.to_path_buf(),
        collection_id,
        language,
        descriptors,
    })
}
