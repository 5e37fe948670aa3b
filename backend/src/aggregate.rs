//! Subsection counts on top-level sections.
//!
//! The count is a function of the current table contents. Every top-level row
//! is rewritten on each pass, so a section whose subsections were removed goes
//! back to 0 and running the pass twice changes nothing.

use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::sqlite::SqliteConnection;

const RECOMPUTE_SQL: &str = r#"
UPDATE hadithSection
SET subsectionCount = (
    SELECT COUNT(*)
    FROM hadithSection AS child
    WHERE child.parentSectionId = hadithSection.sectionId
      AND child.collectionId = hadithSection.collectionId
      AND child.language = hadithSection.language
)
WHERE parentSectionId IS NULL;
"#;

/// Sets `subsectionCount` on every top-level section. Returns the number of
/// rows updated.
pub fn recompute_subsection_counts(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::sql_query(RECOMPUTE_SQL).execute(conn)
}

#[derive(QueryableByName, Debug, Clone, PartialEq)]
pub struct SectionCount {
    #[diesel(sql_type = Integer)]
    #[diesel(column_name = collectionId)]
    pub collection_id: i32,
    #[diesel(sql_type = Text)]
    pub language: String,
    #[diesel(sql_type = Text)]
    #[diesel(column_name = sectionId)]
    pub section_id: String,
    #[diesel(sql_type = Nullable<Integer>)]
    #[diesel(column_name = subsectionCount)]
    pub subsection_count: Option<i32>,
}

/// Stored counts of all top-level sections, ordered by scope and row order.
pub fn get_subsection_counts(conn: &mut SqliteConnection) -> QueryResult<Vec<SectionCount>> {
    diesel::sql_query(
        "SELECT collectionId, language, sectionId, subsectionCount FROM hadithSection \
         WHERE parentSectionId IS NULL ORDER BY collectionId, language, rowId;",
    )
    .load(conn)
}
