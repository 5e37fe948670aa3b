//! Rebuilds the JSON document layout from the store.
//!
//! Output, relative to the export directory:
//!
//! - `<lng>-collections.json`
//! - `<lng>-<book>.json` with records and top-level section metadata
//! - `subsection/<lng>-<book>-subsection.json`
//! - `summarized/<lng>-<book>-summarized.json`
//!
//! Reads only. A file that cannot be written is logged and counted, and the
//! export moves on to the next one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use diesel::sqlite::SqliteConnection;

use crate::collection_id::canonical_book_name;
use crate::db::corpus;
use crate::db::corpus_models::{Collection, Record, Section};
use crate::documents::*;
use crate::errors::CorpusError;
use crate::logger;
use crate::types::{CollectionId, HadithNumber, Language, SectionId};
use crate::{SUBSECTION_DIR_NAME, SUMMARY_DIR_NAME};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
}

impl ExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        ExportOptions { output_dir: output_dir.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub files_written: usize,
    pub files_failed: usize,
    pub collections: usize,
    pub records: usize,
    pub sections: usize,
    pub subsections: usize,
    pub summaries: usize,
}

/// Stored JSON text back to its structure. Text that is not JSON is kept as a
/// plain string.
fn from_json_text(text: &Option<String>) -> Option<Value> {
    match text.as_deref() {
        None | Some("") => None,
        Some(s) => Some(serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))),
    }
}

fn non_empty(text: &Option<String>) -> Option<String> {
    text.clone().filter(|s| !s.is_empty())
}

pub fn record_to_entry(record: &Record) -> HadithEntry {
    HadithEntry {
        hadithnumber: record.id.map(HadithNumber),
        arabicnumber: record.arabic_number.map(HadithNumber),
        text: record.text.clone(),
        grades: from_json_text(&record.grades),
        reference: from_json_text(&record.reference),
        narration: from_json_text(&record.narration),
        tldr: non_empty(&record.tldr),
        narrator: non_empty(&record.narrator),
    }
}

/// Records plus metadata rebuilt from top-level rows only, in ascending
/// section id order.
pub fn build_hadith_document(records: &[Record], sections: &[Section]) -> HadithDocument {
    let top_level: BTreeMap<SectionId, &Section> = sections
        .iter()
        .filter(|s| s.is_top_level())
        .map(|s| (SectionId::new(s.section_id.clone()), s))
        .collect();

    let mut metadata = DocumentMetadata::default();
    for (id, s) in top_level {
        metadata.sections.insert(id.clone(), s.section_title.clone());
        metadata.section_details.insert(id, SectionBounds {
            hadithnumber_first: s.hadith_number_first.map(HadithNumber),
            hadithnumber_last: s.hadith_number_last.map(HadithNumber),
            arabicnumber_first: s.arabic_number_first.map(HadithNumber),
            arabicnumber_last: s.arabic_number_last.map(HadithNumber),
        });
    }

    HadithDocument {
        hadiths: records.iter().map(record_to_entry).collect(),
        metadata,
    }
}

/// Descriptors in ascending subsection id order, with `fileIndex` split back
/// out of the composite id.
pub fn build_subsection_descriptors(subsections: &[Section]) -> Vec<SubsectionDescriptor> {
    let mut sorted: Vec<&Section> = subsections.iter().filter(|s| !s.is_top_level()).collect();
    sorted.sort_by(|a, b| a.section_id.cmp(&b.section_id).then(a.row_id.cmp(&b.row_id)));

    sorted
        .into_iter()
        .map(|s| SubsectionDescriptor {
            file_index: Some(SectionId::new(s.section_id.clone()).file_index()),
            section_title: s.section_title.clone(),
            hadith_number_first: s.hadith_number_first.map(HadithNumber),
            hadith_number_last: s.hadith_number_last.map(HadithNumber),
        })
        .collect()
}

pub fn build_summaries(rows: &[(Option<f64>, Option<String>)]) -> Vec<SummaryExport> {
    rows.iter()
        .filter_map(|(id, summary)| {
            let summary = summary.as_deref().filter(|s| !s.is_empty())?;
            Some(SummaryExport {
                hadithnumber: id.map(HadithNumber),
                summary: summary.to_string(),
            })
        })
        .collect()
}

pub fn build_collection_info(collections: &[Collection]) -> CollectionInfoDocument {
    let infos = collections
        .iter()
        .map(|c| CollectionInfo {
            book_name: c.title.clone(),
            author: c.author.clone(),
            real_name: c.real_name.clone(),
            description: c.description.clone(),
            hadith_count: c.hadith_count,
        })
        .collect();

    let mut doc = IndexMap::new();
    doc.insert(DEFAULT_COLLECTION_FAMILY.to_string(), infos);
    doc
}

/// Pretty-printed, non-ASCII kept as is.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CorpusError> {
    let storage_err = |source: std::io::Error| CorpusError::Storage {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage_err)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(storage_err)?;
    Ok(())
}

pub struct Exporter<'a> {
    conn: &'a mut SqliteConnection,
    options: ExportOptions,
    report: ExportReport,
}

impl<'a> Exporter<'a> {
    pub fn new(conn: &'a mut SqliteConnection, options: ExportOptions) -> Self {
        Exporter {
            conn,
            options,
            report: ExportReport::default(),
        }
    }

    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    fn write_file<T: Serialize>(&mut self, path: &Path, value: &T, what: &str) -> bool {
        match write_json(path, value) {
            Ok(()) => {
                logger::info(&format!("Exported {} ({})", path.display(), what));
                self.report.files_written += 1;
                true
            }
            Err(e) => {
                logger::error(&format!("Failed to write {}: {}", path.display(), e));
                self.report.files_failed += 1;
                false
            }
        }
    }

    /// Resolves a stored scope to its language and export file stem.
    fn scope_names(collection_id: i32, language: &str) -> Option<(CollectionId, Language, &'static str)> {
        let collection_id = CollectionId(collection_id);

        let language = match Language::from_str(language) {
            Ok(l) => l,
            Err(e) => {
                logger::warn(&format!("Skipping collection {}: {}", collection_id, e));
                return None;
            }
        };

        match canonical_book_name(collection_id) {
            Some(book) => Some((collection_id, language, book)),
            None => {
                logger::warn(&format!("Skipping: {}", CorpusError::UnknownCollectionName(collection_id)));
                None
            }
        }
    }

    pub fn export_collection_info(&mut self) -> Result<()> {
        for language in Language::ALL {
            let collections = corpus::get_collections(self.conn, language)
                .with_context(|| format!("Failed to read {} collections", language))?;
            if collections.is_empty() {
                continue;
            }

            let path = self.options.output_dir.join(format!("{}-collections.json", language.file_prefix()));
            let doc = build_collection_info(&collections);
            if self.write_file(&path, &doc, &format!("{} collections", collections.len())) {
                self.report.collections += collections.len();
            }
        }
        Ok(())
    }

    pub fn export_hadith_documents(&mut self) -> Result<()> {
        let scopes = corpus::get_record_scopes(self.conn).context("Failed to list record scopes")?;

        for (cid, lang) in scopes {
            let Some((collection_id, language, book)) = Self::scope_names(cid, &lang) else {
                continue;
            };

            let records = corpus::get_records(self.conn, collection_id, language)?;
            let sections = corpus::get_top_level_sections_by_id(self.conn, collection_id, language)?;
            let doc = build_hadith_document(&records, &sections);

            let path = self.options.output_dir.join(format!("{}-{}.json", language.file_prefix(), book));
            let what = format!("{} hadiths, {} sections", doc.hadiths.len(), doc.metadata.sections.len());
            if self.write_file(&path, &doc, &what) {
                self.report.records += doc.hadiths.len();
                self.report.sections += doc.metadata.sections.len();
            }
        }
        Ok(())
    }

    pub fn export_subsections(&mut self) -> Result<()> {
        let scopes = corpus::get_subsection_scopes(self.conn).context("Failed to list subsection scopes")?;

        for (cid, lang) in scopes {
            let Some((collection_id, language, book)) = Self::scope_names(cid, &lang) else {
                continue;
            };

            let subsections = corpus::get_subsections(self.conn, collection_id, language)?;
            let descriptors = build_subsection_descriptors(&subsections);
            if descriptors.is_empty() {
                continue;
            }

            let path = self.options.output_dir
                .join(SUBSECTION_DIR_NAME)
                .join(format!("{}-{}-subsection.json", language.file_prefix(), book));
            if self.write_file(&path, &descriptors, &format!("{} subsections", descriptors.len())) {
                self.report.subsections += descriptors.len();
            }
        }
        Ok(())
    }

    pub fn export_summaries(&mut self) -> Result<()> {
        let scopes = corpus::get_summary_scopes(self.conn).context("Failed to list summary scopes")?;

        for (cid, lang) in scopes {
            let Some((collection_id, language, book)) = Self::scope_names(cid, &lang) else {
                continue;
            };

            let rows = corpus::get_summaries(self.conn, collection_id, language)?;
            let summaries = build_summaries(&rows);
            if summaries.is_empty() {
                continue;
            }

            let path = self.options.output_dir
                .join(SUMMARY_DIR_NAME)
                .join(format!("{}-{}-summarized.json", language.file_prefix(), book));
            if self.write_file(&path, &summaries, &format!("{} summaries", summaries.len())) {
                self.report.summaries += summaries.len();
            }
        }
        Ok(())
    }

    pub fn run(mut self) -> Result<ExportReport> {
        logger::info(&format!("Exporting corpus to {}", self.options.output_dir.display()));
        self.export_collection_info()?;
        self.export_hadith_documents()?;
        self.export_subsections()?;
        self.export_summaries()?;
        Ok(self.report)
    }
}

pub fn run_export(conn: &mut SqliteConnection, options: ExportOptions) -> Result<ExportReport> {
    Exporter::new(conn, options).run()
}
