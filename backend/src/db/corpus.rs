//! Reads and writes against the three corpus tables.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::corpus_models::*;
use crate::db::corpus_schema::{hadith_collection, hadith_data, hadith_section};
use crate::types::{CollectionId, Language};

/// Replace-on-conflict keyed by (id, language).
pub fn upsert_collection(conn: &mut SqliteConnection, collection: &NewCollection) -> QueryResult<usize> {
    diesel::replace_into(hadith_collection::table)
        .values(collection)
        .execute(conn)
}

/// Plain append, no deduplication. Importing the same file twice doubles the rows.
pub fn insert_records(conn: &mut SqliteConnection, records: &[NewRecord]) -> QueryResult<usize> {
    let mut inserted = 0;
    for record in records {
        inserted += diesel::insert_into(hadith_data::table)
            .values(record)
            .execute(conn)?;
    }
    Ok(inserted)
}

pub fn insert_section(conn: &mut SqliteConnection, section: &NewSection) -> QueryResult<usize> {
    diesel::insert_into(hadith_section::table)
        .values(section)
        .execute(conn)
}

/// Top-level sections of a scope in row insertion order.
pub fn get_top_level_sections(
    conn: &mut SqliteConnection,
    collection_id: CollectionId,
    language: Language,
) -> QueryResult<Vec<Section>> {
    hadith_section::table
        .filter(hadith_section::collection_id.eq(collection_id.0))
        .filter(hadith_section::language.eq(language.as_str()))
        .filter(hadith_section::parent_section_id.is_null())
        .order(hadith_section::row_id.asc())
        .select(Section::as_select())
        .load(conn)
}

/// Top-level sections of a scope in ascending section id order.
pub fn get_top_level_sections_by_id(
    conn: &mut SqliteConnection,
    collection_id: CollectionId,
    language: Language,
) -> QueryResult<Vec<Section>> {
    hadith_section::table
        .filter(hadith_section::collection_id.eq(collection_id.0))
        .filter(hadith_section::language.eq(language.as_str()))
        .filter(hadith_section::parent_section_id.is_null())
        .order((hadith_section::section_id.asc(), hadith_section::row_id.asc()))
        .select(Section::as_select())
        .load(conn)
}

pub fn get_subsections(
    conn: &mut SqliteConnection,
    collection_id: CollectionId,
    language: Language,
) -> QueryResult<Vec<Section>> {
    hadith_section::table
        .filter(hadith_section::collection_id.eq(collection_id.0))
        .filter(hadith_section::language.eq(language.as_str()))
        .filter(hadith_section::parent_section_id.is_not_null())
        .order((hadith_section::section_id.asc(), hadith_section::row_id.asc()))
        .select(Section::as_select())
        .load(conn)
}

/// Records of a scope ordered by record number, then insertion order.
pub fn get_records(
    conn: &mut SqliteConnection,
    collection_id: CollectionId,
    language: Language,
) -> QueryResult<Vec<Record>> {
    hadith_data::table
        .filter(hadith_data::collection_id.eq(collection_id.0))
        .filter(hadith_data::language.eq(language.as_str()))
        .order((hadith_data::id.asc(), hadith_data::row_id.asc()))
        .select(Record::as_select())
        .load(conn)
}

pub fn get_collections(conn: &mut SqliteConnection, language: Language) -> QueryResult<Vec<Collection>> {
    hadith_collection::table
        .filter(hadith_collection::language.eq(language.as_str()))
        .order(hadith_collection::id.asc())
        .select(Collection::as_select())
        .load(conn)
}

/// Distinct (collection id, language) pairs that have records.
pub fn get_record_scopes(conn: &mut SqliteConnection) -> QueryResult<Vec<(i32, String)>> {
    hadith_data::table
        .select((hadith_data::collection_id, hadith_data::language))
        .distinct()
        .order((hadith_data::collection_id.asc(), hadith_data::language.asc()))
        .load(conn)
}

/// Distinct (collection id, language) pairs that have subsection rows.
pub fn get_subsection_scopes(conn: &mut SqliteConnection) -> QueryResult<Vec<(i32, String)>> {
    hadith_section::table
        .filter(hadith_section::parent_section_id.is_not_null())
        .select((hadith_section::collection_id, hadith_section::language))
        .distinct()
        .order((hadith_section::collection_id.asc(), hadith_section::language.asc()))
        .load(conn)
}

/// Distinct (collection id, language) pairs with at least one non-empty summary.
pub fn get_summary_scopes(conn: &mut SqliteConnection) -> QueryResult<Vec<(i32, String)>> {
    hadith_data::table
        .filter(hadith_data::summary.is_not_null())
        .filter(hadith_data::summary.ne(""))
        .select((hadith_data::collection_id, hadith_data::language))
        .distinct()
        .order((hadith_data::collection_id.asc(), hadith_data::language.asc()))
        .load(conn)
}

/// (record number, summary) pairs with a non-empty summary, by record number.
pub fn get_summaries(
    conn: &mut SqliteConnection,
    collection_id: CollectionId,
    language: Language,
) -> QueryResult<Vec<(Option<f64>, Option<String>)>> {
    hadith_data::table
        .filter(hadith_data::collection_id.eq(collection_id.0))
        .filter(hadith_data::language.eq(language.as_str()))
        .filter(hadith_data::summary.is_not_null())
        .filter(hadith_data::summary.ne(""))
        .order((hadith_data::id.asc(), hadith_data::row_id.asc()))
        .select((hadith_data::id, hadith_data::summary))
        .load(conn)
}

pub fn count_records(conn: &mut SqliteConnection) -> QueryResult<i64> {
    hadith_data::table.count().get_result(conn)
}

pub fn count_sections(conn: &mut SqliteConnection) -> QueryResult<i64> {
    hadith_section::table.count().get_result(conn)
}

/// Empties the three tables. Import never deduplicates, so a re-run should
/// start from here.
pub fn truncate_corpus(conn: &mut SqliteConnection) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let mut deleted = diesel::delete(hadith_section::table).execute(conn)?;
        deleted += diesel::delete(hadith_data::table).execute(conn)?;
        deleted += diesel::delete(hadith_collection::table).execute(conn)?;
        Ok(deleted)
    })
}
