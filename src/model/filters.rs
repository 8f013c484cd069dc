//! Sort parameters for list endpoints, constrained by an allow-list.

use crate::validator::{permitted_value, Validator};

/// Allowed `sort` values for `GET /movies`. A leading `-` means descending.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "title",
    "rating",
    "release_date",
    "-title",
    "-rating",
    "-release_date",
];

pub const DEFAULT_MOVIE_SORT: &str = "-rating";

/// Column used when an unvalidated sort value reaches query construction.
const FALLBACK_COLUMN: &str = "movie_id";

#[derive(Debug, Clone)]
pub struct Filters {
    pub sort: String,
    pub sort_safelist: Vec<&'static str>,
}

impl Filters {
    pub fn movies(sort: impl Into<String>) -> Self {
        Self {
            sort: sort.into(),
            sort_safelist: MOVIE_SORT_SAFELIST.to_vec(),
        }
    }

    /// The SQL column for `sort`. Callers must run [`validate_filters`] first.
    pub fn sort_column(&self) -> &'static str {
        if permitted_value(&self.sort.as_str(), &self.sort_safelist) {
            if let Some(column) = column_for(self.sort_key()) {
                return column;
            }
        }
        debug_assert!(false, "unsafe sort parameter: {}", self.sort);
        tracing::error!(sort = %self.sort, "unvalidated sort parameter reached query construction");
        FALLBACK_COLUMN
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    /// `sort` without its descending marker.
    pub fn sort_key(&self) -> &str {
        self.sort.strip_prefix('-').unwrap_or(&self.sort)
    }

    pub fn descending(&self) -> bool {
        self.sort.starts_with('-')
    }
}

/// Maps public sort keys to columns of the `movies` table.
fn column_for(key: &str) -> Option<&'static str> {
    match key {
        "title" => Some("title"),
        "rating" => Some("rating"),
        "release_date" => Some("release_date"),
        _ => None,
    }
}

pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(
        permitted_value(&f.sort.as_str(), &f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}
