// ABOUTME: Defines the Record struct stored by every backend and the ListFilter predicate.
// ABOUTME: Records serialize to the flat JSON shape used by the snapshot file and import/export files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single product record. The `id` is the only unique field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub category: String,
}

/// Returned by [`Record::validate`] when a payload is not acceptable.
#[derive(Debug, Error)]
#[error("invalid record: {0}")]
pub struct InvalidRecord(pub String);

impl Record {
    /// Create a record with the given fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        quantity: i64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            category: category.into(),
        }
    }

    /// Check the payload-level rules enforced at the input boundary.
    /// The stores themselves accept any record.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if !self.price.is_finite() {
            return Err(InvalidRecord("price must be a finite number".to_string()));
        }
        if self.price < 0.0 {
            return Err(InvalidRecord("price cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// Optional predicates applied by `list`. Unset fields do not constrain;
/// set fields are combined with AND. Price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ListFilter {
    /// A filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Returns true when the record satisfies every set predicate.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = &self.category
            && record.category != *category
        {
            return false;
        }
        if let Some(min) = self.min_price
            && record.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && record.price > max
        {
            return false;
        }
        true
    }
}
