use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `persons` table, as returned to API clients.
///
/// `deleted_at` is only ever set by a soft delete. Every normal read path
/// filters such rows out, so API clients will practically always see `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Person {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    pub country: String,
}

/// The writable part of a `Person`, used as the request body for both
/// create and update.
///
/// Every field is optional on the wire and falls back to its zero value, so an
/// update that omits `last_name` clears it. Storage-owned fields (`id`,
/// timestamps) are accepted in the JSON and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonPayload {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    pub country: String,
}

impl PersonPayload {
    /// Checks the only business rule on input: a first name must be present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.first_name.is_empty() {
            return Err(CoreError::InvalidInput(
                "first_name".to_string(),
                "Name is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Overwrites the inferred attributes with a fresh enrichment result.
    ///
    /// Whatever the caller supplied for `gender`, `age` and `country` is
    /// discarded. An attribute the inference services could not guess is
    /// stored as its zero value.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) {
        self.gender = enrichment.gender.unwrap_or_default();
        self.age = enrichment.age.unwrap_or_default();
        self.country = enrichment.country.unwrap_or_default();
    }
}

/// The attributes inferred from a first name by the external services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub gender: Option<String>,
    pub age: Option<i32>,
    /// The most probable country code, if the service had any guess.
    pub country: Option<String>,
}

/// Optional filters for listing persons. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    /// Case-insensitive substring of the first name.
    pub name: Option<String>,
    /// Exact gender label.
    pub gender: Option<String>,
    /// Exact country code.
    pub country: Option<String>,
}

impl PersonFilter {
    /// Builds a filter from raw query values, treating empty strings as absent.
    pub fn new(name: Option<String>, gender: Option<String>, country: Option<String>) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            name: non_empty(name),
            gender: non_empty(gender),
            country: non_empty(country),
        }
    }
}

/// 1-based offset pagination.
///
/// Neither `page` nor `size` is range-checked here; a non-positive value
/// produces a negative limit or offset and it is up to storage to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl Pagination {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// `(page - 1) * size`, saturating instead of overflowing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}
