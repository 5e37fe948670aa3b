//! The import run as three explicit stages.
//!
//! ```text
//! DocumentStage  -> SubsectionStage  -> AggregateStage -> ImportReport
//!  collections,      descriptors         subsectionCount
//!  records,          attached to
//!  top-level         top-level rows
//!  sections
//! ```
//!
//! A stage can only be reached by finishing the one before it, so the
//! subsection pass never runs while documents are still being imported. The
//! subsection stage additionally checks that its scope has top-level sections
//! before resolving anything.
//!
//! Every file is written in its own transaction. A file that fails to load or
//! store is logged, counted and left out; the run continues with the next file.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::aggregate::recompute_subsection_counts;
use crate::db::corpus;
use crate::errors::CorpusError;
use crate::hierarchy::{resolve_scope, MatchKind, ParentCandidate};
use crate::loader::{
    classify_file_name, discover_json_files, file_name_of, load_collection_info,
    load_hadith_document, load_subsection_file, CorpusFileKind,
};
use crate::logger;
use crate::types::{CollectionId, Language};
use crate::SUBSECTION_DIR_NAME;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Per-language documents, collection info files and the summary folders.
    pub corpus_dir: PathBuf,
    /// Subsection descriptor files. Descriptor files found in `corpus_dir`
    /// are picked up as well.
    pub subsection_dir: PathBuf,
    /// Empty the store before importing.
    pub truncate_first: bool,
}

impl ImportOptions {
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        let corpus_dir = corpus_dir.into();
        ImportOptions {
            subsection_dir: corpus_dir.join(SUBSECTION_DIR_NAME),
            corpus_dir,
            truncate_first: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files_imported: usize,
    pub files_skipped: usize,
    pub collections_upserted: usize,
    pub records_inserted: usize,
    pub summaries_attached: usize,
    pub sections_inserted: usize,
    pub subsection_files: usize,
    pub subsections_inserted: usize,
    pub subsections_overlapped: usize,
    pub subsections_skipped: usize,
    pub parents_recounted: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files imported:        {}", self.files_imported)?;
        writeln!(f, "Files skipped:         {}", self.files_skipped)?;
        writeln!(f, "Collections upserted:  {}", self.collections_upserted)?;
        writeln!(f, "Records inserted:      {}", self.records_inserted)?;
        writeln!(f, "Summaries attached:    {}", self.summaries_attached)?;
        writeln!(f, "Sections inserted:     {}", self.sections_inserted)?;
        writeln!(f, "Subsection files:      {}", self.subsection_files)?;
        writeln!(
            f,
            "Subsections inserted:  {} ({} by overlap)",
            self.subsections_inserted, self.subsections_overlapped
        )?;
        writeln!(f, "Subsections skipped:   {}", self.subsections_skipped)?;
        write!(f, "Parents recounted:     {}", self.parents_recounted)
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Documents { records: usize, sections: usize },
    CollectionInfo { upserted: usize },
    Subsections { inserted: usize, skipped: usize },
    /// A descriptor file met in the corpus directory, handed to the subsection stage.
    Deferred,
    /// Not imported on its own, e.g. a summary side-file.
    Ignored,
    Skipped,
}

/// Stage 1: collection info, records and top-level sections.
pub struct DocumentStage<'a> {
    conn: &'a mut SqliteConnection,
    options: ImportOptions,
    report: ImportReport,
    deferred: Vec<PathBuf>,
    scopes: BTreeSet<(CollectionId, Language)>,
}

impl<'a> DocumentStage<'a> {
    pub fn new(conn: &'a mut SqliteConnection, options: ImportOptions) -> Result<Self> {
        if options.truncate_first {
            let deleted = corpus::truncate_corpus(conn).context("Failed to truncate corpus tables")?;
            logger::info(&format!("Truncated corpus tables, {} rows deleted", deleted));
        }

        Ok(DocumentStage {
            conn,
            options,
            report: ImportReport::default(),
            deferred: Vec::new(),
            scopes: BTreeSet::new(),
        })
    }

    /// JSON files of the corpus directory, in file name order.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        discover_json_files(&self.options.corpus_dir)
            .with_context(|| format!("Failed to list corpus directory: {}", self.options.corpus_dir.display()))
    }

    /// Imports one file. Errors are logged and counted, never returned.
    pub fn import_file(&mut self, path: &Path) -> FileOutcome {
        match self.try_import_file(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                logger::warn(&format!("Skipping {}: {:#}", file_name_of(path), e));
                self.report.files_skipped += 1;
                FileOutcome::Skipped
            }
        }
    }

    fn try_import_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let file_name = file_name_of(path);

        match classify_file_name(&file_name) {
            CorpusFileKind::CollectionInfo(language) => self.import_collection_info(path, language),
            CorpusFileKind::HadithData(language) => self.import_document(path, language),
            CorpusFileKind::Subsection(_) => {
                self.deferred.push(path.to_path_buf());
                Ok(FileOutcome::Deferred)
            }
            CorpusFileKind::Summary(_) => {
                logger::debug(&format!("Summary side-file, not imported directly: {}", file_name));
                Ok(FileOutcome::Ignored)
            }
            CorpusFileKind::Unrecognized => Err(CorpusError::UnknownLanguage(file_name).into()),
        }
    }

    fn import_collection_info(&mut self, path: &Path, language: Language) -> Result<FileOutcome> {
        let info = load_collection_info(path, language)?;

        for name in &info.unresolved {
            logger::warn(&format!(
                "{}: could not determine collection ID for book_name '{}'",
                file_name_of(path),
                name
            ));
        }

        let rows = info.new_collections();
        let upserted = self.conn.transaction(|conn| -> Result<usize> {
            let mut n = 0;
            for row in &rows {
                n += corpus::upsert_collection(conn, row)?;
            }
            Ok(n)
        }).with_context(|| format!("Failed to store collections from {}", path.display()))?;

        logger::info(&format!("{}: {} collections", file_name_of(path), rows.len()));

        self.report.files_imported += 1;
        self.report.collections_upserted += rows.len();
        Ok(FileOutcome::CollectionInfo { upserted })
    }

    fn import_document(&mut self, path: &Path, language: Language) -> Result<FileOutcome> {
        let doc = load_hadith_document(path, language, &self.options.corpus_dir)?;
        let records = doc.new_records()?;
        let sections = doc.new_sections();

        let (records_inserted, sections_inserted) = self.conn.transaction(|conn| -> Result<(usize, usize)> {
            let r = corpus::insert_records(conn, &records)?;
            let mut s = 0;
            for section in &sections {
                s += corpus::insert_section(conn, section)?;
            }
            Ok((r, s))
        }).with_context(|| format!("Failed to store {}", path.display()))?;

        let summaries = records.iter().filter(|r| r.summary.is_some()).count();
        if let Some(source) = &doc.summary_source {
            logger::info(&format!(
                "{}: attached {} summaries from {}",
                file_name_of(path),
                summaries,
                source.display()
            ));
        }

        logger::info(&format!(
            "{}: collection {} ({}), {} records, {} sections",
            file_name_of(path),
            doc.collection_id,
            language,
            records_inserted,
            sections_inserted
        ));

        self.scopes.insert((doc.collection_id, language));
        self.report.files_imported += 1;
        self.report.records_inserted += records_inserted;
        self.report.summaries_attached += summaries;
        self.report.sections_inserted += sections_inserted;

        Ok(FileOutcome::Documents { records: records_inserted, sections: sections_inserted })
    }

    /// Scopes that received records in this run.
    pub fn scopes(&self) -> &BTreeSet<(CollectionId, Language)> {
        &self.scopes
    }

    /// Ends the document stage. Descriptor files come from the subsection
    /// directory (when it exists) and from those deferred above. Each file
    /// name is resolved once; the subsection directory copy wins.
    pub fn finish(self) -> Result<SubsectionStage<'a>> {
        let mut by_name: BTreeMap<String, PathBuf> = self.deferred
            .into_iter()
            .map(|p| (file_name_of(&p), p))
            .collect();

        if self.options.subsection_dir.is_dir() {
            let found = discover_json_files(&self.options.subsection_dir)?;
            for path in found {
                let name = file_name_of(&path);
                if !matches!(classify_file_name(&name), CorpusFileKind::Subsection(_)) {
                    continue;
                }
                if let Some(shadowed) = by_name.insert(name, path.clone()) {
                    if shadowed != path {
                        logger::warn(&format!(
                            "Ignoring {}, using {} instead",
                            shadowed.display(),
                            path.display()
                        ));
                    }
                }
            }
        } else {
            logger::info(&format!(
                "No subsection directory at {}",
                self.options.subsection_dir.display()
            ));
        }

        let files: Vec<PathBuf> = by_name.into_values().collect();

        Ok(SubsectionStage {
            conn: self.conn,
            files,
            report: self.report,
        })
    }
}

/// Stage 2: attach subsection descriptors to stored top-level sections.
pub struct SubsectionStage<'a> {
    conn: &'a mut SqliteConnection,
    files: Vec<PathBuf>,
    report: ImportReport,
}

impl<'a> SubsectionStage<'a> {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn import_file(&mut self, path: &Path) -> FileOutcome {
        match self.try_import_file(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                logger::warn(&format!("Skipping {}: {:#}", file_name_of(path), e));
                self.report.files_skipped += 1;
                FileOutcome::Skipped
            }
        }
    }

    fn try_import_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let file = load_subsection_file(path)?;
        let file_name = file_name_of(path);

        let parents: Vec<ParentCandidate> = corpus::get_top_level_sections(self.conn, file.collection_id, file.language)?
            .iter()
            .map(ParentCandidate::from)
            .collect();

        if parents.is_empty() {
            self.report.subsection_files += 1;
            self.report.subsections_skipped += file.descriptors.len();
            let err = CorpusError::MissingTopLevelSections {
                collection_id: file.collection_id,
                language: file.language,
            };
            logger::warn(&format!(
                "{}: {}, {} descriptors skipped",
                file_name,
                err,
                file.descriptors.len()
            ));
            return Ok(FileOutcome::Subsections { inserted: 0, skipped: file.descriptors.len() });
        }

        let resolution = resolve_scope(&parents, &file.descriptors);

        for skipped in &resolution.skipped {
            let err = CorpusError::UnmatchedSubsection {
                file: file_name.clone(),
                detail: skipped.to_string(),
            };
            logger::warn(&err.to_string());
        }

        for s in resolution.attached.iter().filter(|s| s.kind == MatchKind::Overlapped) {
            logger::debug(&format!(
                "{}: {} attached to {} by overlap",
                file_name, s.section_id, s.parent_id
            ));
        }

        let rows: Vec<_> = resolution
            .attached
            .iter()
            .map(|s| s.to_new_section(file.collection_id, file.language))
            .collect();

        let inserted = self.conn.transaction(|conn| -> Result<usize> {
            let mut n = 0;
            for row in &rows {
                n += corpus::insert_section(conn, row)?;
            }
            Ok(n)
        }).with_context(|| format!("Failed to store subsections from {}", path.display()))?;

        let skipped = resolution.skipped.len();
        logger::info(&format!(
            "{}: {} subsections attached, {} skipped",
            file_name, inserted, skipped
        ));

        self.report.subsection_files += 1;
        self.report.subsections_inserted += inserted;
        self.report.subsections_overlapped += resolution.count_by_kind(MatchKind::Overlapped);
        self.report.subsections_skipped += skipped;

        Ok(FileOutcome::Subsections { inserted, skipped })
    }

    pub fn finish(self) -> AggregateStage<'a> {
        AggregateStage {
            conn: self.conn,
            report: self.report,
        }
    }
}

/// Stage 3: recompute subsection counts.
pub struct AggregateStage<'a> {
    conn: &'a mut SqliteConnection,
    report: ImportReport,
}

impl AggregateStage<'_> {
    pub fn run(self) -> Result<ImportReport> {
        let mut report = self.report;
        report.parents_recounted = recompute_subsection_counts(self.conn)
            .context("Failed to recompute subsection counts")?;
        logger::info(&format!("Recounted subsections of {} top-level sections", report.parents_recounted));
        Ok(report)
    }
}

/// Runs all three stages over the corpus directory.
pub fn run_import(conn: &mut SqliteConnection, options: ImportOptions) -> Result<ImportReport> {
    logger::info(&format!("Importing corpus from {}", options.corpus_dir.display()));

    let mut documents = DocumentStage::new(conn, options)?;
    for path in documents.files()? {
        documents.import_file(&path);
    }

    let mut subsections = documents.finish()?;
    for path in subsections.files().to_vec() {
        subsections.import_file(&path);
    }

    let report = subsections.finish().run()?;
    logger::info(&format!("Import finished\n{}", report));
    Ok(report)
}
