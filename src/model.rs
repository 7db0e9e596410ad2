//! Entities held by the caches and the input records that create them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::lfu::EntityId;

/// An input record failed validation. The message names the field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: EntityId,
    pub name: String,
}

/// An expense with its category and tags resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: EntityId,
    pub name: String,
    pub category: Option<Category>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDto {
    pub name: String,
}

/// Full expense body used by create and replace.
///
/// `tags: None` leaves an existing expense's tags untouched on replace;
/// `Some(vec![])` clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDto {
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Partial expense update; absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseUpdateDto {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{field} cannot be blank")));
    }
    Ok(())
}

fn require_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}

impl CategoryDto {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("category name", &self.name)
    }
}

impl TagDto {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("tag name", &self.name)
    }
}

impl ExpenseDto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("expense name", &self.name)?;
        require_amount(self.amount)?;
        require_non_blank("currency", &self.currency)?;
        require_non_blank("category", &self.category)?;
        if let Some(tags) = &self.tags {
            tags.iter().try_for_each(|t| require_non_blank("tag name", t))?;
        }
        Ok(())
    }
}

impl ExpenseUpdateDto {
    /// Only a present amount or tag list is checked; blank strings mean
    /// "leave unchanged".
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            require_amount(amount)?;
        }
        if let Some(tags) = &self.tags {
            tags.iter().try_for_each(|t| require_non_blank("tag name", t))?;
        }
        Ok(())
    }
}

/// `Some(s)` if `value` holds non-blank text.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
