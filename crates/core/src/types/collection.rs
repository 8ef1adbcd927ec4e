//! Collection shapes shared by the authoring, import and extraction tools.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort order of a smart collection.
///
/// Serialized with the REST Admin API spelling (`best-selling`, `alpha-asc`...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    BestSelling,
    AlphaAsc,
    AlphaDesc,
    PriceAsc,
    PriceDesc,
    CreatedDesc,
}

impl SortOrder {
    /// All supported sort orders, in menu order.
    pub const ALL: [Self; 6] = [
        Self::BestSelling,
        Self::AlphaAsc,
        Self::AlphaDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::CreatedDesc,
    ];

    /// The API value of this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestSelling => "best-selling",
            Self::AlphaAsc => "alpha-asc",
            Self::AlphaDesc => "alpha-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::CreatedDesc => "created-desc",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BestSelling => "Best Selling",
            Self::AlphaAsc => "A-Z",
            Self::AlphaDesc => "Z-A",
            Self::PriceAsc => "Price Low-High",
            Self::PriceDesc => "Price High-Low",
            Self::CreatedDesc => "Newest First",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| UnknownSortOrder(s.to_string()))
    }
}

/// A smart collection membership rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRule {
    pub column: String,
    pub relation: String,
    pub condition: String,
}

impl CollectionRule {
    /// Rule matching products carrying exactly `tag`.
    #[must_use]
    pub fn tag_equals(tag: impl Into<String>) -> Self {
        Self {
            column: "tag".to_string(),
            relation: "equals".to_string(),
            condition: tag.into(),
        }
    }
}

/// A smart collection as written to `smart_collections.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartCollection {
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub rules: Vec<CollectionRule>,
}

/// A collection listed on a storefront's public `collections.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCollection {
    pub title: String,
    pub handle: String,
    pub url: String,
}

/// Keep collections whose title contains `term`, ignoring case.
#[must_use]
pub fn filter_by_title<'a>(
    collections: &'a [ExtractedCollection],
    term: &str,
) -> Vec<&'a ExtractedCollection> {
    let needle = term.to_lowercase();
    collections
        .iter()
        .filter(|c| c.title.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn extracted(title: &str) -> ExtractedCollection {
        ExtractedCollection {
            title: title.to_string(),
            handle: title.to_lowercase().replace(' ', "-"),
            url: format!("https://example.com/collections/{}", title.to_lowercase()),
        }
    }

    #[test]
    fn test_sort_order_serializes_kebab_case() {
        let json = serde_json::to_string(&SortOrder::CreatedDesc).unwrap();
        assert_eq!(json, "\"created-desc\"");
        let parsed: SortOrder = serde_json::from_str("\"price-asc\"").unwrap();
        assert_eq!(parsed, SortOrder::PriceAsc);
    }

    #[test]
    fn test_sort_order_from_str_round_trips() {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>().unwrap(), order);
        }
        assert!("manual".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_default_is_best_selling() {
        assert_eq!(SortOrder::default(), SortOrder::BestSelling);
    }

    #[test]
    fn test_tag_equals_rule() {
        let rule = CollectionRule::tag_equals("cus-summer");
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            serde_json::json!({"column": "tag", "relation": "equals", "condition": "cus-summer"})
        );
    }

    #[test]
    fn test_filter_by_title_is_case_insensitive() {
        let collections = vec![extracted("Summer Sale"), extracted("Winter"), extracted("SUMMER hats")];
        let hits = filter_by_title(&collections, "summer");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Summer Sale");
        assert_eq!(hits[1].title, "SUMMER hats");
    }

    #[test]
    fn test_filter_by_empty_term_keeps_all() {
        let collections = vec![extracted("A"), extracted("B")];
        assert_eq!(filter_by_title(&collections, "").len(), 2);
    }
}
