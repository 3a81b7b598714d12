use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single food waste record.
///
/// Created with only the initial weight; the remaining weight is filled in
/// later once the food has been served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    /// Store-assigned identifier (UUID v4)
    pub id: String,
    /// Calendar date the entry pertains to
    pub date: NaiveDate,
    /// Meal category, e.g. "breakfast", "lunch", "dinner"
    pub meal_type: String,
    /// Name of the food
    pub food_item: String,
    /// Weight in kilograms before service
    pub initial_weight: f64,
    /// Weight in kilograms left over after service, if recorded yet
    pub remaining_weight: Option<f64>,
    /// When the store accepted the entry (RFC 3339)
    pub created_at: String,
}

impl FoodEntry {
    /// Whether both weighing phases have been recorded.
    pub fn is_completed(&self) -> bool {
        self.remaining_weight.is_some()
    }
}

/// Derived waste metric for an entry.
///
/// Serialized as a bare number, or as the string `"N/A"` when undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WastePercentage {
    /// Unrounded percentage; negative when more was left than was weighed in
    Percent(f64),
    /// Remaining weight not recorded yet, or initial weight is zero
    NotApplicable,
}

impl WastePercentage {
    pub fn value(&self) -> Option<f64> {
        match self {
            WastePercentage::Percent(value) => Some(*value),
            WastePercentage::NotApplicable => None,
        }
    }
}

impl fmt::Display for WastePercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WastePercentage::Percent(value) => write!(f, "{:.1}", value),
            WastePercentage::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for WastePercentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WastePercentage::Percent(value) => serializer.serialize_f64(*value),
            WastePercentage::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for WastePercentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(WastePercentage::Percent(value)),
            Raw::Text(text) if text == "N/A" => Ok(WastePercentage::NotApplicable),
            Raw::Text(text) => Err(serde::de::Error::custom(format!(
                "expected a number or \"N/A\", got {:?}",
                text
            ))),
        }
    }
}

/// Severity bucket used to color the waste column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteLevel {
    NotApplicable,
    /// 25% or less
    Low,
    /// Above 25%, up to 50%
    Medium,
    /// Above 50%
    High,
}

/// Columns an entry list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Date,
    MealType,
    FoodItem,
    InitialWeight,
    RemainingWeight,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Date,
        SortField::MealType,
        SortField::FoodItem,
        SortField::InitialWeight,
        SortField::RemainingWeight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::MealType => "meal_type",
            SortField::FoodItem => "food_item",
            SortField::InitialWeight => "initial_weight",
            SortField::RemainingWeight => "remaining_weight",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALL: [SortDirection; 2] = [SortDirection::Asc, SortDirection::Desc];

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Request body for recording the initial weight of a food item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    /// Calendar date in `YYYY-MM-DD` form
    pub date: String,
    pub meal_type: String,
    pub food_item: String,
    /// Kilograms
    pub initial_weight: f64,
}

/// Request body for recording the leftover weight of an existing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRemainingRequest {
    /// Kilograms
    pub remaining_weight: f64,
}

/// Search and sort parameters for the entry table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryTableRequest {
    pub search: Option<String>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

/// An entry prepared for table display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedEntry {
    pub id: String,
    pub formatted_date: String,
    pub meal_type: String,
    pub food_item: String,
    pub formatted_initial_weight: String,
    pub formatted_remaining_weight: String,
    pub formatted_waste: String,
    pub waste_level: WasteLevel,
    pub waste_percentage: WastePercentage,
    pub raw_date: NaiveDate,
    pub raw_initial_weight: f64,
    pub raw_remaining_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryTableResponse {
    pub entries: Vec<FormattedEntry>,
    pub sort: SortField,
    pub direction: SortDirection,
    /// Number of entries in the store before the search filter was applied
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryListResponse {
    pub entries: Vec<FoodEntry>,
}

/// Error body returned by the HTTP adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending field, for validation failures
    pub field: Option<String>,
}
