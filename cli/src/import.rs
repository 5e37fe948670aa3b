use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};

use corpus_backend::db::open_corpus_db;
use corpus_backend::loader::file_name_of;
use corpus_backend::logger::{self, format_duration};
use corpus_backend::pipeline::{DocumentStage, ImportOptions, ImportReport};

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Runs the three import stages with a progress bar over the files of each.
pub fn import_corpus(db_path: &Path, options: ImportOptions) -> Result<ImportReport> {
    logger::info("=== import_corpus() ===");
    let start_time: DateTime<Local> = Local::now();

    let mut conn = open_corpus_db(db_path)
        .with_context(|| format!("Failed to open corpus database: {}", db_path.display()))?;

    logger::info(&format!("Importing documents from {}", options.corpus_dir.display()));
    let mut documents = DocumentStage::new(&mut conn, options)?;
    let files = documents.files()?;
    logger::info(&format!("Found {} JSON files", files.len()));

    let pb = progress_bar(files.len())?;
    for path in &files {
        pb.set_message(file_name_of(path));
        documents.import_file(path);
        pb.inc(1);
    }
    pb.finish_with_message("Documents done");

    let mut subsections = documents.finish()?;
    let files = subsections.files().to_vec();
    logger::info(&format!("Resolving {} subsection files", files.len()));

    let pb = progress_bar(files.len())?;
    for path in &files {
        pb.set_message(file_name_of(path));
        subsections.import_file(path);
        pb.inc(1);
    }
    pb.finish_with_message("Subsections done");

    let report = subsections.finish().run()?;

    let end_time = Local::now();
    let msg = format!(
r#"
======
Import started: {}
Import ended:   {}
Duration:       {}
======
{}
"#,
        start_time.format("%Y-%m-%d %H:%M:%S"),
        end_time.format("%Y-%m-%d %H:%M:%S"),
        format_duration(end_time - start_time),
        report,
    );

    logger::info(&msg);
    println!("{}", msg);

    Ok(report)
}
