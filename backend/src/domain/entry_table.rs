//! Entry table display logic.
//!
//! Turns raw entries into table rows: formatted dates and weights, the waste
//! percentage rounded for display and its severity level. Rounding happens
//! only here; the domain always works with the unrounded percentage.
//!
//! ## Core Components
//!
//! - **EntryTableService**: formats entries and runs the search/sort pipeline
//! - **EntryTableConfig**: display preferences
//! - **FormattedEntry**: one table row (defined in `shared`)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{EntryTableRequest, EntryTableResponse, FoodEntry, FormattedEntry, WastePercentage};

use crate::domain::query::SortState;
use crate::domain::waste;

/// Configuration for entry table display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryTableConfig {
    pub date_format: DateFormat,
    pub waste_decimal_places: usize,
    pub weight_unit: String,
}

/// Date formatting options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DateFormat {
    MonthDayYear, // "Jan 10, 2024"
    ShortDate,    // "01/10/2024"
    ISO,          // "2024-01-10"
}

impl Default for EntryTableConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::MonthDayYear,
            waste_decimal_places: 1,
            weight_unit: "kg".to_string(),
        }
    }
}

#[derive(Clone, Default)]
pub struct EntryTableService {
    config: EntryTableConfig,
}

impl EntryTableService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EntryTableConfig) -> Self {
        Self { config }
    }

    /// Search, sort and format `entries` for display.
    ///
    /// Missing sort parameters fall back to newest date first.
    pub fn build_table(&self, entries: &[FoodEntry], request: &EntryTableRequest) -> EntryTableResponse {
        let defaults = SortState::default();
        let state = SortState {
            field: request.sort.unwrap_or(defaults.field),
            direction: request.direction.unwrap_or(defaults.direction),
        };
        let term = request.search.as_deref().unwrap_or("");

        let rows = state
            .apply(entries, term)
            .into_iter()
            .map(|entry| self.format_single_entry(entry))
            .collect();

        EntryTableResponse {
            entries: rows,
            sort: state.field,
            direction: state.direction,
            total_count: entries.len(),
        }
    }

    pub fn format_single_entry(&self, entry: &FoodEntry) -> FormattedEntry {
        let percentage = waste::waste_percentage(entry);
        FormattedEntry {
            id: entry.id.clone(),
            formatted_date: self.format_date(entry.date),
            meal_type: entry.meal_type.clone(),
            food_item: entry.food_item.clone(),
            formatted_initial_weight: self.format_weight(entry.initial_weight),
            formatted_remaining_weight: entry
                .remaining_weight
                .map(|weight| self.format_weight(weight))
                .unwrap_or_else(|| "-".to_string()),
            formatted_waste: self.format_waste(percentage),
            waste_level: waste::waste_level(self.displayed_waste(percentage)),
            waste_percentage: percentage,
            raw_date: entry.date,
            raw_initial_weight: entry.initial_weight,
            raw_remaining_weight: entry.remaining_weight,
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        match self.config.date_format {
            DateFormat::MonthDayYear => date.format("%b %-d, %Y").to_string(),
            DateFormat::ShortDate => date.format("%m/%d/%Y").to_string(),
            DateFormat::ISO => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn format_weight(&self, weight: f64) -> String {
        format!("{} {}", weight, self.config.weight_unit)
    }

    /// The percentage at display precision, so the level always agrees with
    /// the number shown next to it
    fn displayed_waste(&self, percentage: WastePercentage) -> WastePercentage {
        match percentage {
            WastePercentage::Percent(value) => {
                let shown = format!("{:.*}", self.config.waste_decimal_places, value);
                WastePercentage::Percent(shown.parse().unwrap_or(value))
            }
            WastePercentage::NotApplicable => WastePercentage::NotApplicable,
        }
    }

    pub fn format_waste(&self, percentage: WastePercentage) -> String {
        match percentage {
            WastePercentage::Percent(value) => {
                format!("{:.*}%", self.config.waste_decimal_places, value)
            }
            WastePercentage::NotApplicable => "N/A".to_string(),
        }
    }
}
