//! Smart collection authoring commands.
//!
//! Edits a `smart_collections.json` file that `sc-cli import` (or the
//! `/import-collections` endpoint) can consume.
//!
//! # Usage
//!
//! ```bash
//! sc-cli collections add --handle summer --title "Summer" --condition-tag cus-summer
//! sc-cli collections list
//! sc-cli collections remove --index 0
//! ```

use std::path::Path;

use shop_console_core::collections::{CollectionError, SmartCollectionDraft, SmartCollectionSet};
use shop_console_core::{SmartCollection, SortOrder};
use thiserror::Error;

use super::{FileError, read_text, write_text};

/// Errors that can occur while editing a collections file.
#[derive(Debug, Error)]
pub enum CollectionsError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Load the set stored at `path`, or an empty set if the file does not exist.
pub fn load(path: &Path) -> Result<SmartCollectionSet, CollectionsError> {
    if !path.exists() {
        return Ok(SmartCollectionSet::new());
    }
    let text = read_text(path)?;
    Ok(SmartCollectionSet::from_json(&text)?)
}

fn save(path: &Path, set: &SmartCollectionSet) -> Result<(), CollectionsError> {
    write_text(path, &set.to_json()?)?;
    Ok(())
}

/// Fields of a new collection.
#[derive(Debug)]
pub struct NewCollection {
    pub handle: String,
    pub title: String,
    pub condition_tag: String,
    pub body_html: String,
    pub sort_order: SortOrder,
}

/// Append a collection and save the file.
pub fn add(path: &Path, new: NewCollection) -> Result<usize, CollectionsError> {
    let mut set = load(path)?;
    let index = set.add(SmartCollectionDraft {
        handle: new.handle,
        title: new.title,
        body_html: new.body_html,
        sort_order: new.sort_order,
        condition_tag: new.condition_tag,
    })?;
    save(path, &set)?;
    tracing::info!(index, count = set.len(), file = %path.display(), "Added smart collection");
    Ok(index)
}

/// Remove the collection at `index` and save the file.
pub fn remove(path: &Path, index: usize) -> Result<SmartCollection, CollectionsError> {
    let mut set = load(path)?;
    let removed = set.remove(index)?;
    save(path, &set)?;
    tracing::info!(handle = %removed.handle, count = set.len(), "Removed smart collection");
    Ok(removed)
}

/// One display line per collection.
#[must_use]
pub fn describe(set: &SmartCollectionSet) -> Vec<String> {
    set.as_slice()
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let tags: Vec<&str> = c.rules.iter().map(|r| r.condition.as_str()).collect();
            format!(
                "{index}\t{}\t{}\t{}\t{}",
                c.handle,
                c.title,
                c.sort_order.label(),
                tags.join(",")
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::scratch_path;

    fn new(handle: &str, tag: &str) -> NewCollection {
        NewCollection {
            handle: handle.to_string(),
            title: handle.to_uppercase(),
            condition_tag: tag.to_string(),
            body_html: String::new(),
            sort_order: SortOrder::default(),
        }
    }

    #[test]
    fn test_add_list_remove() {
        let path = scratch_path("smart_collections.json");
        std::fs::remove_file(&path).ok();

        assert_eq!(add(&path, new("summer", "cus-summer")).unwrap(), 0);
        assert_eq!(add(&path, new("winter", "cus-winter")).unwrap(), 1);

        let set = load(&path).unwrap();
        let lines = describe(&set);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1\twinter\tWINTER\tBest Selling\tcus-winter");

        let removed = remove(&path, 0).unwrap();
        assert_eq!(removed.handle, "summer");
        assert_eq!(load(&path).unwrap().len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_add_rejects_blank_tag_without_touching_file() {
        let path = scratch_path("blank_tag.json");
        std::fs::remove_file(&path).ok();

        let err = add(&path, new("summer", "  ")).unwrap_err();
        assert!(matches!(err, CollectionsError::Collection(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_out_of_range() {
        let path = scratch_path("out_of_range.json");
        std::fs::remove_file(&path).ok();
        assert!(remove(&path, 3).is_err());
    }
}
