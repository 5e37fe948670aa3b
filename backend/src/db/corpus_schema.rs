// Persisted names follow the corpus layout (camelCase); Rust names are snake_case.

diesel::table! {
    #[sql_name = "hadithCollection"]
    hadith_collection (id, language) {
        id -> Integer,
        language -> Text,
        title -> Nullable<Text>,
        author -> Nullable<Text>,
        #[sql_name = "realName"]
        real_name -> Nullable<Text>,
        description -> Nullable<Text>,
        #[sql_name = "hadithCount"]
        hadith_count -> Nullable<BigInt>,
    }
}

diesel::table! {
    #[sql_name = "hadithData"]
    hadith_data (row_id) {
        #[sql_name = "rowId"]
        row_id -> Integer,
        #[sql_name = "collectionId"]
        collection_id -> Integer,
        id -> Nullable<Double>,
        #[sql_name = "arabicNumber"]
        arabic_number -> Nullable<Double>,
        text -> Text,
        language -> Text,
        grades -> Nullable<Text>,
        reference -> Nullable<Text>,
        narration -> Nullable<Text>,
        tldr -> Nullable<Text>,
        narrator -> Nullable<Text>,
        summary -> Nullable<Text>,
    }
}

diesel::table! {
    #[sql_name = "hadithSection"]
    hadith_section (row_id) {
        #[sql_name = "rowId"]
        row_id -> Integer,
        #[sql_name = "collectionId"]
        collection_id -> Integer,
        #[sql_name = "sectionId"]
        section_id -> Text,
        language -> Text,
        #[sql_name = "sectionTitle"]
        section_title -> Nullable<Text>,
        #[sql_name = "hadithNumberFirst"]
        hadith_number_first -> Nullable<Double>,
        #[sql_name = "hadithNumberLast"]
        hadith_number_last -> Nullable<Double>,
        #[sql_name = "arabicNumberFirst"]
        arabic_number_first -> Nullable<Double>,
        #[sql_name = "arabicNumberLast"]
        arabic_number_last -> Nullable<Double>,
        #[sql_name = "parentSectionId"]
        parent_section_id -> Nullable<Text>,
        #[sql_name = "subsectionCount"]
        subsection_count -> Nullable<Integer>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    hadith_collection,
    hadith_data,
    hadith_section,
);
