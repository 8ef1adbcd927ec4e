//! Merging assigned tags into master rows.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::TagAssignment;
use crate::types::{Row, TAGS_COLUMN};

const TAG_SEPARATOR: &str = ", ";

/// Which mapped rows are eligible for new tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowGate {
    /// Only rows with a non-blank `Title` or non-blank `Tags`.
    ///
    /// Product exports repeat the handle on variant and image rows that leave
    /// both columns empty; this keeps tags on the primary product row.
    #[default]
    TitleOrTags,
    /// Every row whose handle is mapped.
    AnyRow,
}

impl RowGate {
    /// Whether `row` may receive tags under this gate.
    #[must_use]
    pub fn admits(self, row: &Row) -> bool {
        match self {
            Self::TitleOrTags => !row.title().trim().is_empty() || !row.tags().trim().is_empty(),
            Self::AnyRow => true,
        }
    }
}

/// Rows after merging, with the number whose `Tags` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub rows: Vec<Row>,
    pub updated_count: usize,
}

/// Split a `Tags` value into trimmed, non-empty, de-duplicated tags.
#[must_use]
pub fn parse_tags(value: &str) -> IndexSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add assigned tags to every eligible row.
///
/// Row count, order and every column other than `Tags` are left exactly as
/// given. A row's `Tags` is rewritten only when at least one new tag was
/// added, so applying the same assignment twice changes nothing the second
/// time.
#[must_use]
pub fn apply_tags(mut rows: Vec<Row>, assignment: &TagAssignment, gate: RowGate) -> ApplyOutcome {
    let mut updated_count = 0;

    for row in &mut rows {
        let Some(assigned) = row.handle().and_then(|handle| assignment.get(handle)) else {
            continue;
        };
        if !gate.admits(row) {
            continue;
        }

        let mut tags = parse_tags(row.tags());
        let before = tags.len();
        tags.extend(assigned.iter().cloned());

        if tags.len() > before {
            let joined = tags.into_iter().collect::<Vec<_>>().join(TAG_SEPARATOR);
            row.set(TAGS_COLUMN, joined);
            updated_count += 1;
        }
    }

    ApplyOutcome {
        rows,
        updated_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(handle: &str, title: &str, tags: &str) -> Row {
        [
            ("Handle", handle),
            ("Title", title),
            ("Tags", tags),
            ("Variant SKU", "SKU-1"),
        ]
        .into_iter()
        .collect()
    }

    fn assignment(pairs: &[(&str, &str)]) -> TagAssignment {
        let mut assignment = TagAssignment::new();
        for (handle, tag) in pairs {
            assignment.insert(*handle, *tag);
        }
        assignment
    }

    #[test]
    fn test_parse_tags_trims_and_dedups() {
        let tags = parse_tags(" a, b ,, a,c ,");
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn test_appends_new_tag_after_existing() {
        let rows = vec![row("mug-01", "Mug", "featured")];
        let outcome = apply_tags(
            rows,
            &assignment(&[("mug-01", "cus-new-arrivals")]),
            RowGate::default(),
        );
        assert_eq!(outcome.rows[0].tags(), "featured, cus-new-arrivals");
        assert_eq!(outcome.updated_count, 1);
    }

    #[test]
    fn test_gate_skips_rows_without_title_or_tags() {
        let rows = vec![row("mug-02", "", ""), row("mug-02", "  ", " ")];
        let outcome = apply_tags(
            rows.clone(),
            &assignment(&[("mug-02", "cus-a")]),
            RowGate::TitleOrTags,
        );
        assert_eq!(outcome.rows, rows);
        assert_eq!(outcome.updated_count, 0);
    }

    #[test]
    fn test_any_row_gate_tags_continuation_rows() {
        let rows = vec![row("mug-02", "", "")];
        let outcome = apply_tags(rows, &assignment(&[("mug-02", "cus-a")]), RowGate::AnyRow);
        assert_eq!(outcome.rows[0].tags(), "cus-a");
        assert_eq!(outcome.updated_count, 1);
    }

    #[test]
    fn test_tags_only_row_passes_gate() {
        let rows = vec![row("mug-03", "", "existing")];
        let outcome = apply_tags(rows, &assignment(&[("mug-03", "cus-a")]), RowGate::TitleOrTags);
        assert_eq!(outcome.rows[0].tags(), "existing, cus-a");
    }

    #[test]
    fn test_unmapped_and_blank_handles_unchanged() {
        let rows = vec![row("other", "Other", "x"), row("", "Image row", "")];
        let outcome = apply_tags(rows.clone(), &assignment(&[("mug-01", "cus-a")]), RowGate::AnyRow);
        assert_eq!(outcome.rows, rows);
        assert_eq!(outcome.updated_count, 0);
    }

    #[test]
    fn test_existing_tag_is_not_duplicated() {
        let rows = vec![row("mug-01", "Mug", "cus-a, featured")];
        let outcome = apply_tags(rows.clone(), &assignment(&[("mug-01", "cus-a")]), RowGate::default());
        assert_eq!(outcome.rows, rows);
        assert_eq!(outcome.updated_count, 0);
    }

    #[test]
    fn test_rewrite_normalizes_and_dedups_existing_tags() {
        let rows = vec![row("mug-01", "Mug", "b,a , b")];
        let outcome = apply_tags(rows, &assignment(&[("mug-01", "cus-a")]), RowGate::default());
        assert_eq!(outcome.rows[0].tags(), "b, a, cus-a");
    }

    #[test]
    fn test_multiple_tags_keep_assignment_order() {
        let rows = vec![row("shirt-01", "Shirt", "")];
        let mapping = assignment(&[("shirt-01", "cus-a"), ("shirt-01", "cus-b")]);
        let once = apply_tags(rows, &mapping, RowGate::default());
        assert_eq!(once.rows[0].tags(), "cus-a, cus-b");

        let twice = apply_tags(once.rows.clone(), &mapping, RowGate::default());
        assert_eq!(twice.rows, once.rows);
        assert_eq!(twice.updated_count, 0);
    }

    #[test]
    fn test_non_tag_fields_and_order_preserved() {
        let rows = vec![
            row("a", "A", ""),
            row("", "", ""),
            row("b", "B", "x"),
            row("a", "", ""),
        ];
        let mapping = assignment(&[("a", "cus-1"), ("b", "cus-2")]);
        let outcome = apply_tags(rows.clone(), &mapping, RowGate::default());

        assert_eq!(outcome.rows.len(), rows.len());
        assert_eq!(outcome.updated_count, 2);
        for (before, after) in rows.iter().zip(&outcome.rows) {
            let before: Vec<_> = before.iter().filter(|(k, _)| *k != TAGS_COLUMN).collect();
            let after: Vec<_> = after.iter().filter(|(k, _)| *k != TAGS_COLUMN).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_row_without_tags_column_gains_one_at_the_end() {
        let rows: Vec<Row> = vec![[("Handle", "mug-01"), ("Title", "Mug")].into_iter().collect()];
        let outcome = apply_tags(rows, &assignment(&[("mug-01", "cus-a")]), RowGate::default());
        let columns: Vec<&str> = outcome.rows[0].columns().collect();
        assert_eq!(columns, vec!["Handle", "Title", "Tags"]);
    }
}
