//! Core types for the Shop Console.

pub mod collection;
pub mod id;
pub mod import;
pub mod row;

pub use collection::{
    CollectionRule, ExtractedCollection, SmartCollection, SortOrder, UnknownSortOrder,
    filter_by_title,
};
pub use id::RunId;
pub use import::{ImportFailure, ImportProgress, ImportResults, UNKNOWN_HANDLE};
pub use row::{HANDLE_COLUMN, HANDLE_COLUMN_LOWER, Row, TAGS_COLUMN, TITLE_COLUMN, Table};
