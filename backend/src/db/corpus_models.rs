use diesel::prelude::*;

use crate::db::corpus_schema::*;

#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = hadith_collection)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Collection {
    pub id: i32,
    pub language: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub real_name: Option<String>,
    pub description: Option<String>,
    pub hadith_count: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = hadith_collection)]
pub struct NewCollection<'a> {
    pub id: i32,
    pub language: &'a str,
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub real_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub hadith_count: Option<i64>,
}

// Queryable struct for reading hadith rows
#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = hadith_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Record {
    pub row_id: i32,
    pub collection_id: i32,
    pub id: Option<f64>,
    pub arabic_number: Option<f64>,
    pub text: String,
    pub language: String,
    pub grades: Option<String>,
    pub reference: Option<String>,
    pub narration: Option<String>,
    pub tldr: Option<String>,
    pub narrator: Option<String>,
    pub summary: Option<String>,
}

/// Owned, since the structured side-fields are serialized just before insertion.
#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = hadith_data)]
pub struct NewRecord {
    pub collection_id: i32,
    pub id: Option<f64>,
    pub arabic_number: Option<f64>,
    pub text: String,
    pub language: String,
    pub grades: Option<String>,
    pub reference: Option<String>,
    pub narration: Option<String>,
    pub tldr: Option<String>,
    pub narrator: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = hadith_section)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Section {
    pub row_id: i32,
    pub collection_id: i32,
    pub section_id: String,
    pub language: String,
    pub section_title: Option<String>,
    pub hadith_number_first: Option<f64>,
    pub hadith_number_last: Option<f64>,
    pub arabic_number_first: Option<f64>,
    pub arabic_number_last: Option<f64>,
    pub parent_section_id: Option<String>,
    pub subsection_count: Option<i32>,
}

impl Section {
    pub fn is_top_level(&self) -> bool {
        self.parent_section_id.is_none()
    }
}

/// Top-level rows leave `parent_section_id` as None; `subsection_count` is
/// never written on insert, only by the aggregate pass.
#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = hadith_section)]
pub struct NewSection<'a> {
    pub collection_id: i32,
    pub section_id: &'a str,
    pub language: &'a str,
    pub section_title: Option<&'a str>,
    pub hadith_number_first: Option<f64>,
    pub hadith_number_last: Option<f64>,
    pub arabic_number_first: Option<f64>,
    pub arabic_number_last: Option<f64>,
    pub parent_section_id: Option<&'a str>,
}
