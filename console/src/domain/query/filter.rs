//! User-editable filter state consumed by the query engine.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Sentinel accepted from user input meaning "no constraint".
pub const ALL: &str = "all";

/// Sort key used when the view has not chosen one.
pub const DEFAULT_SORT_KEY: &str = "name";

/// Constraint on one categorical field.
///
/// # Examples
/// ```
/// use bloodbank_console::domain::query::CategoricalFilter;
///
/// assert_eq!(CategoricalFilter::parse("all"), CategoricalFilter::All);
/// assert!(CategoricalFilter::parse("O+").admits(Some("O+")));
/// assert!(!CategoricalFilter::parse("O+").admits(Some("o+")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalFilter {
    /// Any value, including none.
    #[default]
    All,
    /// Exactly this value.
    Equals(String),
}

impl CategoricalFilter {
    /// Read user input; `"all"` (any case) and blank input mean no constraint.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Equals(trimmed.to_owned())
        }
    }

    /// Whether a record value satisfies the constraint.
    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Equals(expected) => value == Some(expected.as_str()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// The other direction.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Apply the direction to an ascending comparison.
    pub fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}

/// Search text, categorical constraints, and sort order for one list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    search_text: String,
    categorical: BTreeMap<String, CategoricalFilter>,
    sort_key: String,
    sort_direction: SortDirection,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            categorical: BTreeMap::new(),
            sort_key: DEFAULT_SORT_KEY.to_owned(),
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl FilterState {
    /// Set the search text.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.set_search(text);
        self
    }

    /// Constrain a categorical field from raw user input.
    #[must_use]
    pub fn with_category(mut self, field: impl Into<String>, raw: &str) -> Self {
        self.set_category(field, raw);
        self
    }

    /// Choose the sort key and direction.
    #[must_use]
    pub fn with_sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_key = key.into();
        self.sort_direction = direction;
        self
    }

    /// Replace the search text.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Replace one categorical constraint; `"all"` removes it.
    pub fn set_category(&mut self, field: impl Into<String>, raw: &str) {
        let field = field.into();
        match CategoricalFilter::parse(raw) {
            CategoricalFilter::All => {
                self.categorical.remove(&field);
            }
            filter => {
                self.categorical.insert(field, filter);
            }
        }
    }

    /// Replace the sort key; direction is kept.
    pub fn set_sort_key(&mut self, key: impl Into<String>) {
        self.sort_key = key.into();
    }

    /// Flip the sort direction.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_direction = self.sort_direction.toggle();
    }

    /// Current search text.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Active constraints by field name.
    pub fn categorical(&self) -> &BTreeMap<String, CategoricalFilter> {
        &self.categorical
    }

    /// Constraint for one field; [`CategoricalFilter::All`] when unset.
    pub fn category(&self, field: &str) -> CategoricalFilter {
        self.categorical.get(field).cloned().unwrap_or_default()
    }

    /// Current sort key.
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    /// Current sort direction.
    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}
