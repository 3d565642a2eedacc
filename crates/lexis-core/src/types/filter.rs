//! Filter types for corpus lookups.
//!
//! Corpus records expose string fields only (`id`, `content`, `word`,
//! `chunk_type`), so conditions compare strings.

use serde::{Deserialize, Serialize};

/// Filter operator for field queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to.
    Eq(String),
    /// Not equal to.
    Ne(String),
    /// In list.
    In(Vec<String>),
    /// Contains substring.
    Contains(String),
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field name to filter on.
    pub field: String,
    /// Operator to apply.
    pub operator: FilterOperator,
}

impl FilterCondition {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Eq(value.into()),
        }
    }

    /// Create an inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Ne(value.into()),
        }
    }

    /// Create a contains filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Contains(value.into()),
        }
    }

    /// Create an in-list filter.
    pub fn in_list(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::In(values),
        }
    }

    /// Evaluate against a field value. Missing fields never match.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.operator {
            FilterOperator::Eq(expected) => value == expected,
            FilterOperator::Ne(expected) => value != expected,
            FilterOperator::In(values) => values.iter().any(|v| v == value),
            FilterOperator::Contains(needle) => value.contains(needle.as_str()),
        }
    }
}

/// Composite filter with AND/OR/NOT logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Single condition.
    Condition(FilterCondition),
    /// AND of multiple filters.
    And(Vec<Filter>),
    /// OR of multiple filters.
    Or(Vec<Filter>),
    /// NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Condition(FilterCondition::eq(field, value))
    }

    /// Create a substring filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Condition(FilterCondition::contains(field, value))
    }

    /// Create an AND filter.
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    /// Create an OR filter.
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Create a NOT filter.
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Evaluate the filter, resolving field values through `field`.
    pub fn evaluate<'a, F>(&self, field: &F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        match self {
            Filter::Condition(condition) => condition.matches(field(&condition.field)),
            Filter::And(filters) => filters.iter().all(|f| f.evaluate(field)),
            Filter::Or(filters) => filters.iter().any(|f| f.evaluate(field)),
            Filter::Not(inner) => !inner.evaluate(field),
        }
    }
}
