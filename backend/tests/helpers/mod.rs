use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use diesel::sqlite::SqliteConnection;
use dotenvy::dotenv;
use serde_json::{json, Value};
use tempfile::TempDir;

use corpus_backend::db::open_corpus_db;

static ENV_INIT: Once = Once::new();

pub fn env_setup() {
    ENV_INIT.call_once(|| {
        dotenv().ok();
        // Tests run #[serial], nothing else reads the environment concurrently.
        unsafe {
            env::set_var("DISABLE_LOG", "true");
            env::set_var("CORPUS_DIR", env::temp_dir().join("hadith-corpus-tests"));
        }
    });
}

pub struct TestCorpus {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub conn: SqliteConnection,
}

impl TestCorpus {
    pub fn corpus_dir(&self) -> PathBuf {
        self.dir.path().join("corpus")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.dir.path().join("export")
    }
}

/// Empty store plus an empty corpus directory, both in a fresh temp dir.
pub fn corpus_setup() -> TestCorpus {
    env_setup();
    let dir = tempfile::tempdir().expect("Can't create temp dir");
    let db_path = dir.path().join("hadith.sqlite3");
    let conn = open_corpus_db(&db_path).expect("Can't open corpus db");
    fs::create_dir_all(dir.path().join("corpus")).expect("Can't create corpus dir");
    TestCorpus { dir, db_path, conn }
}

#[allow(dead_code)]
pub fn write_json(dir: &Path, rel_path: &str, value: &Value) {
    let path = dir.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Can't create fixture dir");
    }
    fs::write(&path, serde_json::to_string_pretty(value).expect("Can't serialize")).expect("Can't write fixture");
}

#[allow(dead_code)]
pub fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("Can't read {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("Invalid JSON")
}

/// Metadata form, records 1 to 30 in three sections: [1,9] [10,20] [21,30].
#[allow(dead_code)]
pub fn eng_bukhari_document() -> Value {
    let hadiths: Vec<Value> = (1..=30)
        .map(|n| {
            let mut h = json!({
                "hadithnumber": n,
                "arabicnumber": n,
                "text": format!("Hadith {}", n),
            });
            if n % 10 == 1 {
                h["grades"] = json!([{"name": "Al-Albani", "grade": "Sahih"}]);
                h["reference"] = json!({"book": 1, "hadith": n});
                h["narrator"] = json!("Narrated Abu Hurairah");
            }
            h
        })
        .collect();

    json!({
        "hadiths": hadiths,
        "metadata": {
            "sections": {
                "1": "Revelation",
                "2": "Belief",
                "3": "Knowledge"
            },
            "section_details": {
                "1": {"hadithnumber_first": 1, "hadithnumber_last": 9, "arabicnumber_first": 1, "arabicnumber_last": 9},
                "2": {"hadithnumber_first": 10, "hadithnumber_last": 20, "arabicnumber_first": 10, "arabicnumber_last": 20},
                "3": {"hadithnumber_first": 21, "hadithnumber_last": 30, "arabicnumber_first": 21, "arabicnumber_last": 30}
            }
        }
    })
}

/// Overlapping, contained, contained past the end, unmatched, missing start.
#[allow(dead_code)]
pub fn eng_bukhari_subsections() -> Value {
    json!([
        {"fileIndex": 1, "sectionTitle": "Beginning of revelation", "hadithNumberFirst": 0, "hadithNumberLast": 5},
        {"fileIndex": 2, "sectionTitle": "Love of the Prophet", "hadithNumberFirst": 12, "hadithNumberLast": 15},
        {"fileIndex": 3, "sectionTitle": "Off by one", "hadithNumberFirst": 19, "hadithNumberLast": 22},
        {"fileIndex": 4, "sectionTitle": "Nowhere", "hadithNumberFirst": 40, "hadithNumberLast": 45},
        {"fileIndex": 5, "sectionTitle": "No start", "hadithNumberFirst": null, "hadithNumberLast": 15}
    ])
}

#[allow(dead_code)]
pub fn eng_collections(author: &str) -> Value {
    json!({
        "kutub_al_sittah": [
            {
                "book_name": "Sahih al-Bukhari",
                "author": author,
                "real_name": "Al-Jami' al-Musnad as-Sahih",
                "description": "The most authentic collection",
                "hadith_count": 7563
            },
            {
                "book_name": "Unknown Book",
                "author": "Someone",
                "real_name": null,
                "description": null,
                "hadith_count": 1
            }
        ]
    })
}

/// A corpus directory with one collection in English (metadata form, with
/// summaries and subsections) and Arabic (flat form, no sections), plus files
/// the import must skip.
#[allow(dead_code)]
pub fn write_sample_corpus(corpus_dir: &Path) {
    write_json(corpus_dir, "eng-bukhari.json", &eng_bukhari_document());
    write_json(corpus_dir, "ara-bukhari.json", &json!([
        {"hadithnumber": 1, "arabicnumber": 1, "text": "حديث ١"},
        {"hadithnumber": 2, "arabicnumber": 2, "text": "حديث ٢"},
        {"hadithnumber": 3, "arabicnumber": 3, "text": "حديث ٣"}
    ]));
    write_json(corpus_dir, "eng-collections.json", &eng_collections("Imam Bukhari"));
    write_json(corpus_dir, "eng-unknownbook.json", &json!([{"hadithnumber": 1, "text": "x"}]));
    write_json(corpus_dir, "notes.json", &json!({"note": "not part of the corpus"}));

    write_json(corpus_dir, "subsection/eng-bukhari-subsection.json", &eng_bukhari_subsections());
    write_json(corpus_dir, "subsection/ara-bukhari-subsection.json", &json!([
        {"fileIndex": 1, "sectionTitle": "باب", "hadithNumberFirst": 1, "hadithNumberLast": 2}
    ]));

    write_json(corpus_dir, "summarized/eng-bukhari-summarized.json", &json!([
        {"hadithnumber": 1, "summary": "First summary"},
        {"id": "12", "summary": "Twelfth summary"},
        {"hadithnumber": 13, "summary": ""}
    ]));
}
