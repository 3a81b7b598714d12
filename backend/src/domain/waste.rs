//! Waste metrics derived from an entry's two weights.
//!
//! Nothing here is ever persisted; every value is recomputed from the stored
//! weights whenever it is asked for.

use shared::{FoodEntry, WasteLevel, WastePercentage};

const HIGH_WASTE_THRESHOLD: f64 = 50.0;
const MEDIUM_WASTE_THRESHOLD: f64 = 25.0;

/// Share of the initial weight that was not consumed, in percent.
///
/// Undefined until the remaining weight is recorded, and for a zero initial
/// weight. The value is unrounded and is not clamped: a remaining weight
/// above the initial weight yields a negative percentage.
pub fn waste_percentage(entry: &FoodEntry) -> WastePercentage {
    match entry.remaining_weight {
        Some(remaining) if entry.initial_weight > 0.0 => WastePercentage::Percent(
            (entry.initial_weight - remaining) / entry.initial_weight * 100.0,
        ),
        _ => WastePercentage::NotApplicable,
    }
}

pub fn waste_level(percentage: WastePercentage) -> WasteLevel {
    match percentage {
        WastePercentage::NotApplicable => WasteLevel::NotApplicable,
        WastePercentage::Percent(value) if value > HIGH_WASTE_THRESHOLD => WasteLevel::High,
        WastePercentage::Percent(value) if value > MEDIUM_WASTE_THRESHOLD => WasteLevel::Medium,
        WastePercentage::Percent(_) => WasteLevel::Low,
    }
}

/// Completed entries with food left over that could be redistributed
pub fn has_surplus(entry: &FoodEntry) -> bool {
    matches!(waste_percentage(entry), WastePercentage::Percent(value) if value > 0.0)
}

/// More food left over than was weighed in, almost certainly a typo
pub fn is_anomalous(entry: &FoodEntry) -> bool {
    matches!(entry.remaining_weight, Some(remaining) if remaining > entry.initial_weight)
}
