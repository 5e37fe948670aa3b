use std::path::Path;

use anyhow::{Context, Result};

use corpus_backend::db::open_corpus_db;
use corpus_backend::exporter::{ExportOptions, ExportReport, Exporter};
use corpus_backend::logger;

use crate::CliError;

pub fn export_corpus(db_path: &Path, options: ExportOptions) -> Result<ExportReport> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let mut conn = open_corpus_db(db_path)
        .with_context(|| format!("Failed to open corpus database: {}", db_path.display()))?;

    let report = Exporter::new(&mut conn, options).run()?;

    let msg = format!(
        "Exported {} files: {} collections, {} hadiths, {} sections, {} subsections, {} summaries",
        report.files_written,
        report.collections,
        report.records,
        report.sections,
        report.subsections,
        report.summaries,
    );
    logger::info(&msg);
    println!("{}", msg);

    if report.files_failed > 0 {
        return Err(CliError::ExportIncomplete(report.files_failed).into());
    }

    Ok(report)
}
