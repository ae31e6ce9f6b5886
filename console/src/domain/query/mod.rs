//! In-memory query engine shared by every admin list view.
//!
//! [`apply`] composes free-text search, categorical equality filters, and a
//! stable three-way sort. It borrows the input and returns references, so the
//! fetched collection is never reordered or modified.

mod filter;

pub use filter::{ALL, CategoricalFilter, DEFAULT_SORT_KEY, FilterState, SortDirection};

/// Sortable projection of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValue<'a> {
    /// Compared case-insensitively.
    Text(&'a str),
    /// Compared by value.
    Number(i64),
}

/// Capabilities a record exposes to the query engine.
pub trait Queryable {
    /// Primary display field; also the sort fallback.
    fn display_name(&self) -> &str;

    /// Fields matched by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical field, or `None` when absent or unknown.
    fn categorical_value(&self, field: &str) -> Option<&str>;

    /// Projection for `key`, or `None` when the key is not sortable.
    ///
    /// Missing numeric attributes project to `Number(0)` and missing text to
    /// `Text("")`.
    fn sort_value(&self, key: &str) -> Option<SortValue<'_>>;
}

impl<T: Queryable + ?Sized> Queryable for &T {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }

    fn categorical_value(&self, field: &str) -> Option<&str> {
        (**self).categorical_value(field)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        (**self).sort_value(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
}

impl SortKey {
    fn of<R: Queryable>(record: &R, key: &str) -> Self {
        match record.sort_value(key) {
            Some(SortValue::Number(value)) => Self::Number(value),
            Some(SortValue::Text(text)) => Self::Text(text.to_lowercase()),
            None => Self::Text(record.display_name().to_lowercase()),
        }
    }
}

/// Whether a record passes the search text and every categorical filter.
///
/// The search text is matched as typed, whitespace included; only an empty
/// string admits every record.
pub fn matches<R: Queryable>(record: &R, filter: &FilterState) -> bool {
    let needle = filter.search_text().to_lowercase();
    let searched = needle.is_empty()
        || record
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle));
    searched
        && filter
            .categorical()
            .iter()
            .all(|(field, constraint)| constraint.admits(record.categorical_value(field)))
}

/// Derive the visible subset of `records` for `filter`.
///
/// Equal sort keys keep their input order in both directions.
///
/// # Examples
/// ```
/// use bloodbank_console::domain::query::{FilterState, Queryable, SortValue, apply};
///
/// struct Tag(&'static str);
///
/// impl Queryable for Tag {
///     fn display_name(&self) -> &str { self.0 }
///     fn search_fields(&self) -> Vec<&str> { vec![self.0] }
///     fn categorical_value(&self, _field: &str) -> Option<&str> { None }
///     fn sort_value(&self, _key: &str) -> Option<SortValue<'_>> { None }
/// }
///
/// let tags = [Tag("beta"), Tag("Alpha"), Tag("gamma")];
/// let visible = apply(&tags, &FilterState::default().with_search("A"));
/// let names: Vec<_> = visible.iter().map(|tag| tag.0).collect();
/// assert_eq!(names, ["Alpha", "beta", "gamma"]);
/// ```
pub fn apply<'a, R: Queryable>(records: &'a [R], filter: &FilterState) -> Vec<&'a R> {
    let key = filter.sort_key();
    let direction = filter.sort_direction();
    let mut decorated: Vec<(SortKey, &'a R)> = records
        .iter()
        .filter(|record| matches(*record, filter))
        .map(|record| (SortKey::of(record, key), record))
        .collect();
    decorated.sort_by(|(left, _), (right, _)| direction.orient(left.cmp(right)));
    decorated.into_iter().map(|(_, record)| record).collect()
}
