use chrono::NaiveDate;

use crate::storage::StorageError;

/// Errors surfaced by the entry lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("Invalid {field}: {constraint}")]
    Validation {
        field: &'static str,
        constraint: String,
    },
    #[error("Food entry {0} not found")]
    NotFound(String),
    /// The message shown to users stays generic; the source carries detail
    #[error("Unable to reach the food entry store. Please try again.")]
    Store(#[source] anyhow::Error),
}

impl EntryError {
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        EntryError::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    /// The offending field, for validation failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EntryError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<StorageError> for EntryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => EntryError::NotFound(id),
            StorageError::Backend(source) => EntryError::Store(source),
        }
    }
}

pub type EntryResult<T> = std::result::Result<T, EntryError>;

/// Weights are kilograms: finite and not negative
pub fn validate_weight(field: &'static str, weight: f64) -> EntryResult<f64> {
    if !weight.is_finite() {
        return Err(EntryError::validation(field, "must be a finite number"));
    }
    if weight < 0.0 {
        return Err(EntryError::validation(field, "must not be negative"));
    }
    Ok(weight)
}

/// Free-text labels must have content; surrounding whitespace is dropped
pub fn validate_label(field: &'static str, value: &str) -> EntryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EntryError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn parse_entry_date(value: &str) -> EntryResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EntryError::validation("date", format!("{:?} is not a calendar date (YYYY-MM-DD)", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_weight() {
        assert_eq!(validate_weight("initial_weight", 0.0).unwrap(), 0.0);
        assert_eq!(validate_weight("initial_weight", 2.5).unwrap(), 2.5);

        let err = validate_weight("initial_weight", -0.1).unwrap_err();
        assert_eq!(err.field(), Some("initial_weight"));
        assert_eq!(err.to_string(), "Invalid initial_weight: must not be negative");

        assert!(validate_weight("remaining_weight", f64::NAN).is_err());
        assert!(validate_weight("remaining_weight", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("food_item", "  Rice ").unwrap(), "Rice");
        let err = validate_label("meal_type", "   ").unwrap_err();
        assert_eq!(err.field(), Some("meal_type"));
    }

    #[test]
    fn test_parse_entry_date() {
        assert_eq!(
            parse_entry_date("2024-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert!(parse_entry_date("2024-02-30").is_err());
        assert!(parse_entry_date("10/01/2024").is_err());
        assert_eq!(parse_entry_date("").unwrap_err().field(), Some("date"));
    }

    #[test]
    fn test_storage_errors_map_to_entry_errors() {
        let not_found: EntryError = StorageError::NotFound("abc".to_string()).into();
        assert!(matches!(not_found, EntryError::NotFound(id) if id == "abc"));

        let backend: EntryError = StorageError::Backend(anyhow::anyhow!("disk full")).into();
        assert_eq!(backend.to_string(), "Unable to reach the food entry store. Please try again.");
        assert!(matches!(backend, EntryError::Store(_)));
    }
}
