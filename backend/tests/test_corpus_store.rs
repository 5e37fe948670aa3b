use diesel::prelude::*;
use serial_test::serial;

use corpus_backend::db::corpus_schema::hadith_collection;
use corpus_backend::db::corpus_models::{Collection, NewCollection};
use corpus_backend::db::{corpus, get_table_names, open_corpus_db};
use corpus_backend::pipeline::{run_import, ImportOptions};
use corpus_backend::types::{CollectionId, Language};

mod helpers;
use helpers as h;

#[test]
#[serial]
fn test_schema_creation_is_idempotent() {
    let t = h::corpus_setup();
    let mut conn = t.conn;
    let before = get_table_names(&mut conn).expect("Can't list tables");
    drop(conn);

    let mut conn = open_corpus_db(&t.db_path).expect("Second open failed");
    let after = get_table_names(&mut conn).expect("Can't list tables");

    assert_eq!(before, after);
    for table in ["hadithCollection", "hadithData", "hadithSection"] {
        assert!(after.iter().any(|t| t == table), "missing table {}", table);
    }
}

#[test]
#[serial]
fn test_collection_upsert_replaces_by_key() {
    let mut t = h::corpus_setup();

    let first = NewCollection {
        id: 1,
        language: "english",
        title: Some("Sahih al-Bukhari"),
        author: Some("Old author"),
        real_name: None,
        description: None,
        hadith_count: Some(7000),
    };
    let second = NewCollection {
        author: Some("Imam Bukhari"),
        hadith_count: Some(7563),
        ..first
    };
    let other_language = NewCollection {
        language: "bahasa",
        ..first
    };

    corpus::upsert_collection(&mut t.conn, &first).unwrap();
    corpus::upsert_collection(&mut t.conn, &second).unwrap();
    corpus::upsert_collection(&mut t.conn, &other_language).unwrap();

    let rows: Vec<Collection> = hadith_collection::table
        .filter(hadith_collection::id.eq(1))
        .filter(hadith_collection::language.eq("english"))
        .select(Collection::as_select())
        .load(&mut t.conn)
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author.as_deref(), Some("Imam Bukhari"));
    assert_eq!(rows[0].hadith_count, Some(7563));

    // The bahasa row lives independently under the same id.
    assert_eq!(corpus::get_collections(&mut t.conn, Language::Bahasa).unwrap().len(), 1);
}

#[test]
#[serial]
fn test_collection_info_file_imported_twice() {
    let mut t = h::corpus_setup();
    let corpus_dir = t.corpus_dir();

    h::write_json(&corpus_dir, "eng-collections.json", &h::eng_collections("Old author"));
    run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();

    h::write_json(&corpus_dir, "eng-collections.json", &h::eng_collections("Imam Bukhari"));
    let report = run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();
    assert_eq!(report.collections_upserted, 1);

    let rows = corpus::get_collections(&mut t.conn, Language::English).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, CollectionId(1).0);
    assert_eq!(rows[0].title.as_deref(), Some("Sahih al-Bukhari"));
    assert_eq!(rows[0].author.as_deref(), Some("Imam Bukhari"));
}

#[test]
#[serial]
fn test_reimport_appends_and_truncate_resets() {
    let mut t = h::corpus_setup();
    let corpus_dir = t.corpus_dir();
    h::write_sample_corpus(&corpus_dir);

    run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();
    let records_once = corpus::count_records(&mut t.conn).unwrap();
    let sections_once = corpus::count_sections(&mut t.conn).unwrap();

    // No deduplication: a second run doubles the rows.
    run_import(&mut t.conn, ImportOptions::new(&corpus_dir)).unwrap();
    assert_eq!(corpus::count_records(&mut t.conn).unwrap(), records_once * 2);
    assert!(corpus::count_sections(&mut t.conn).unwrap() > sections_once);

    let mut options = ImportOptions::new(&corpus_dir);
    options.truncate_first = true;
    run_import(&mut t.conn, options).unwrap();
    assert_eq!(corpus::count_records(&mut t.conn).unwrap(), records_once);
    assert_eq!(corpus::count_sections(&mut t.conn).unwrap(), sections_once);

    corpus::truncate_corpus(&mut t.conn).unwrap();
    assert_eq!(corpus::count_records(&mut t.conn).unwrap(), 0);
    assert_eq!(corpus::count_sections(&mut t.conn).unwrap(), 0);
    assert!(corpus::get_collections(&mut t.conn, Language::English).unwrap().is_empty());
}
