use std::collections::BTreeMap;

use serde_json::{json, Value};
use serial_test::serial;

use corpus_backend::exporter::{run_export, ExportOptions};
use corpus_backend::pipeline::{run_import, ImportOptions};

mod helpers;
use helpers as h;

fn records_by_number(doc: &Value) -> BTreeMap<i64, String> {
    doc["hadiths"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| (h["hadithnumber"].as_i64().unwrap(), h["text"].as_str().unwrap().to_string()))
        .collect()
}

#[test]
#[serial]
fn test_export_reproduces_sections_and_records() {
    let mut t = h::corpus_setup();
    let corpus_dir = t.corpus_dir();
    h::write_sample_corpus(&corpus_dir);
    run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();

    let export_dir = t.export_dir();
    let report = run_export(&mut t.conn, ExportOptions::new(&export_dir)).expect("Export failed");

    // eng-collections, ara-bukhari, eng-bukhari, one subsection file, one summary file
    assert_eq!(report.files_written, 5);
    assert_eq!(report.files_failed, 0);

    let original = h::eng_bukhari_document();
    let exported = h::read_json(&export_dir.join("eng-bukhari.json"));

    assert_eq!(exported["metadata"]["sections"], original["metadata"]["sections"]);
    assert_eq!(exported["metadata"]["section_details"], original["metadata"]["section_details"]);
    assert_eq!(records_by_number(&exported), records_by_number(&original));

    // Side-fields come back as structures, absent ones stay absent.
    assert_eq!(exported["hadiths"][0], original["hadiths"][0]);
    assert_eq!(exported["hadiths"][1], json!({"hadithnumber": 2, "arabicnumber": 2, "text": "Hadith 2"}));

    let arabic = h::read_json(&export_dir.join("ara-bukhari.json"));
    assert_eq!(arabic["hadiths"].as_array().unwrap().len(), 3);
    assert_eq!(arabic["metadata"]["sections"], json!({}));
}

#[test]
#[serial]
fn test_export_side_files() {
    let mut t = h::corpus_setup();
    let corpus_dir = t.corpus_dir();
    h::write_sample_corpus(&corpus_dir);
    run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();

    let export_dir = t.export_dir();
    run_export(&mut t.conn, ExportOptions::new(&export_dir)).unwrap();

    let subsections = h::read_json(&export_dir.join("subsection/eng-bukhari-subsection.json"));
    assert_eq!(subsections, json!([
        {"fileIndex": 1, "sectionTitle": "Beginning of revelation", "hadithNumberFirst": 0, "hadithNumberLast": 5},
        {"fileIndex": 2, "sectionTitle": "Love of the Prophet", "hadithNumberFirst": 12, "hadithNumberLast": 15},
        {"fileIndex": 3, "sectionTitle": "Off by one", "hadithNumberFirst": 19, "hadithNumberLast": 22}
    ]));
    assert!(!export_dir.join("subsection/ara-bukhari-subsection.json").exists());

    let summaries = h::read_json(&export_dir.join("summarized/eng-bukhari-summarized.json"));
    assert_eq!(summaries, json!([
        {"hadithnumber": 1, "summary": "First summary"},
        {"hadithnumber": 12, "summary": "Twelfth summary"}
    ]));
    assert!(!export_dir.join("summarized/ara-bukhari-summarized.json").exists());

    let collections = h::read_json(&export_dir.join("eng-collections.json"));
    assert_eq!(collections, json!({
        "kutub_al_sittah": [{
            "book_name": "Sahih al-Bukhari",
            "author": "Imam Bukhari",
            "real_name": "Al-Jami' al-Musnad as-Sahih",
            "description": "The most authentic collection",
            "hadith_count": 7563
        }]
    }));
}

#[test]
#[serial]
fn test_exported_corpus_imports_to_same_store() {
    let mut t = h::corpus_setup();
    let corpus_dir = t.corpus_dir();
    h::write_sample_corpus(&corpus_dir);
    let first = run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();

    let export_dir = t.export_dir();
    run_export(&mut t.conn, ExportOptions::new(&export_dir)).unwrap();

    let mut options = ImportOptions::new(&export_dir);
    options.truncate_first = true;
    let second = run_import(&mut t.conn, options).unwrap();

    assert_eq!(second.records_inserted, first.records_inserted);
    assert_eq!(second.sections_inserted, first.sections_inserted);
    assert_eq!(second.subsections_inserted, first.subsections_inserted);
    assert_eq!(second.summaries_attached, first.summaries_attached);
    assert_eq!(second.collections_upserted, first.collections_upserted);
    // Only resolvable descriptors were exported.
    assert_eq!(second.subsections_skipped, 0);
}
