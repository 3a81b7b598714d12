//! Search and ordering over an in-memory set of entries.
//!
//! Nothing is cached: callers pass the full entry set on every call and get
//! a freshly filtered and ordered view back.

use shared::{FoodEntry, SortDirection, SortField};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Entries whose food item or meal type contains `term`, ignoring case.
///
/// The returned iterator is lazy, keeps the input order and can be cloned to
/// walk the matches again. An empty term matches everything.
pub fn search<'a>(
    entries: &'a [FoodEntry],
    term: &str,
) -> impl Iterator<Item = &'a FoodEntry> + Clone + 'a {
    let needle = term.to_lowercase();
    entries.iter().filter(move |entry| matches_term(entry, &needle))
}

fn matches_term(entry: &FoodEntry, needle: &str) -> bool {
    needle.is_empty()
        || entry.food_item.to_lowercase().contains(needle)
        || entry.meal_type.to_lowercase().contains(needle)
}

/// Stable sort of `entries` by one column.
///
/// Entries without a value for the column (a missing remaining weight) carry
/// no ordering information, so they stay at their input position and the
/// remaining entries are ordered among the other positions.
pub fn sort<T, I>(entries: I, field: SortField, direction: SortDirection) -> Vec<T>
where
    T: Borrow<FoodEntry>,
    I: IntoIterator<Item = T>,
{
    let mut slots: Vec<Option<T>> = entries.into_iter().map(Some).collect();

    let keyed_positions: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| {
            slot.as_ref()
                .map_or(false, |entry| has_sort_key(entry.borrow(), field))
        })
        .map(|(position, _)| position)
        .collect();

    let mut keyed: Vec<T> = keyed_positions
        .iter()
        .filter_map(|&position| slots[position].take())
        .collect();

    keyed.sort_by(|a, b| {
        let ordering = compare_by(a.borrow(), b.borrow(), field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    for (position, entry) in keyed_positions.into_iter().zip(keyed) {
        slots[position] = Some(entry);
    }
    slots.into_iter().flatten().collect()
}

/// Search then sort, the pipeline behind the entry table
pub fn query<'a>(
    entries: &'a [FoodEntry],
    term: &str,
    field: SortField,
    direction: SortDirection,
) -> Vec<&'a FoodEntry> {
    sort(search(entries, term), field, direction)
}

fn has_sort_key(entry: &FoodEntry, field: SortField) -> bool {
    match field {
        SortField::RemainingWeight => entry.remaining_weight.is_some(),
        SortField::Date | SortField::MealType | SortField::FoodItem | SortField::InitialWeight => true,
    }
}

/// Ascending comparison of two entries on `field`
fn compare_by(a: &FoodEntry, b: &FoodEntry, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::MealType => compare_text(&a.meal_type, &b.meal_type),
        SortField::FoodItem => compare_text(&a.food_item, &b.food_item),
        SortField::InitialWeight => a.initial_weight.total_cmp(&b.initial_weight),
        SortField::RemainingWeight => match (a.remaining_weight, b.remaining_weight) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal,
        },
    }
}

/// Dictionary-style text order: case-insensitive first, then lowercase
/// ahead of uppercase for strings that differ only in case.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Column-header sort toggle.
///
/// Starts at newest date first. Picking the active column flips the
/// direction; picking another column sorts it ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn select(&mut self, field: SortField) {
        if field == self.field {
            self.direction = self.direction.reversed();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn apply<'a>(&self, entries: &'a [FoodEntry], term: &str) -> Vec<&'a FoodEntry> {
        query(entries, term, self.field, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: &str, date: &str, meal_type: &str, food_item: &str, initial: f64, remaining: Option<f64>) -> FoodEntry {
        FoodEntry {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            meal_type: meal_type.to_string(),
            food_item: food_item.to_string(),
            initial_weight: initial,
            remaining_weight: remaining,
            created_at: String::new(),
        }
    }

    fn sample_entries() -> Vec<FoodEntry> {
        vec![
            entry("1", "2024-01-10", "lunch", "Rice", 2.0, Some(0.5)),
            entry("2", "2024-01-09", "breakfast", "Bread", 1.0, None),
            entry("3", "2024-01-11", "dinner", "Lentil Soup", 4.0, Some(1.0)),
            entry("4", "2024-01-10", "Lunch", "rice pudding", 2.0, Some(2.0)),
            entry("5", "2024-01-08", "dinner", "Bread rolls", 0.5, None),
        ]
    }

    fn ids<'a, T: Borrow<FoodEntry>>(entries: &'a [T]) -> Vec<&'a str> {
        entries.iter().map(|e| e.borrow().id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_on_both_columns() {
        let entries = sample_entries();

        let rice: Vec<&FoodEntry> = search(&entries, "RICE").collect();
        assert_eq!(ids(&rice), vec!["1", "4"]);

        let lunch: Vec<&FoodEntry> = search(&entries, "lUnCh").collect();
        assert_eq!(ids(&lunch), vec!["1", "4"]);

        let none: Vec<&FoodEntry> = search(&entries, "pasta").collect();
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_search_returns_everything_in_order() {
        let entries = sample_entries();
        let all: Vec<&FoodEntry> = search(&entries, "").collect();
        assert_eq!(ids(&all), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_search_is_restartable() {
        let entries = sample_entries();
        let matches = search(&entries, "bread");
        assert_eq!(matches.clone().count(), 2);
        assert_eq!(ids(&matches.collect::<Vec<_>>()), vec!["2", "5"]);
    }

    #[test]
    fn test_sort_by_food_item_both_directions() {
        let entries = vec![
            entry("rice", "2024-01-10", "lunch", "Rice", 2.0, None),
            entry("bread", "2024-01-11", "lunch", "Bread", 1.0, None),
        ];

        let asc = sort(&entries, SortField::FoodItem, SortDirection::Asc);
        let names: Vec<&str> = asc.iter().map(|e| e.food_item.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Rice"]);

        let desc = sort(&entries, SortField::FoodItem, SortDirection::Desc);
        let names: Vec<&str> = desc.iter().map(|e| e.food_item.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Bread"]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let entries = sample_entries();
        let sorted = sort(&entries, SortField::FoodItem, SortDirection::Asc);
        assert_eq!(ids(&sorted), vec!["2", "5", "3", "1", "4"]);

        assert_eq!(compare_text("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_text("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_text("apple", "apple"), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_date_and_weight() {
        let entries = sample_entries();

        let newest_first = sort(&entries, SortField::Date, SortDirection::Desc);
        assert_eq!(ids(&newest_first), vec!["3", "1", "4", "2", "5"]);

        let lightest_first = sort(&entries, SortField::InitialWeight, SortDirection::Asc);
        assert_eq!(ids(&lightest_first), vec!["5", "2", "1", "4", "3"]);
    }

    #[test]
    fn test_sort_is_stable_and_repeatable() {
        let entries = sample_entries();
        let once = sort(&entries, SortField::MealType, SortDirection::Asc);
        let twice = sort(once.clone(), SortField::MealType, SortDirection::Asc);
        assert_eq!(ids(&once), ids(&twice));

        // "lunch" and "Lunch" compare lowercase-first; the two dinners keep input order
        assert_eq!(ids(&once), vec!["2", "3", "5", "1", "4"]);
    }

    #[test]
    fn test_direction_toggle_keeps_tie_groups_in_input_order() {
        let entries = sample_entries();

        let asc = sort(&entries, SortField::Date, SortDirection::Asc);
        let desc = sort(&entries, SortField::Date, SortDirection::Desc);
        assert_eq!(ids(&asc), vec!["5", "2", "1", "4", "3"]);
        // Entries 1 and 4 share a date and stay in input order either way
        assert_eq!(ids(&desc), vec!["3", "1", "4", "2", "5"]);
    }

    #[test]
    fn test_missing_remaining_weights_keep_their_position() {
        let entries = sample_entries();

        let asc = sort(&entries, SortField::RemainingWeight, SortDirection::Asc);
        assert_eq!(ids(&asc), vec!["1", "2", "3", "4", "5"]);

        let desc = sort(&entries, SortField::RemainingWeight, SortDirection::Desc);
        assert_eq!(ids(&desc), vec!["4", "2", "3", "1", "5"]);

        let again = sort(&entries, SortField::RemainingWeight, SortDirection::Desc);
        assert_eq!(ids(&desc), ids(&again));
    }

    #[test]
    fn test_query_searches_then_sorts() {
        let entries = sample_entries();
        let result = query(&entries, "bread", SortField::Date, SortDirection::Asc);
        assert_eq!(ids(&result), vec!["5", "2"]);

        let result = query(&entries, "", SortField::InitialWeight, SortDirection::Desc);
        assert_eq!(ids(&result), vec!["3", "1", "4", "2", "5"]);
    }

    #[test]
    fn test_sort_state_toggle() {
        let mut state = SortState::default();
        assert_eq!(state.field, SortField::Date);
        assert_eq!(state.direction, SortDirection::Desc);

        state.select(SortField::Date);
        assert_eq!(state.direction, SortDirection::Asc);

        state.select(SortField::FoodItem);
        assert_eq!(state, SortState { field: SortField::FoodItem, direction: SortDirection::Asc });

        state.select(SortField::FoodItem);
        assert_eq!(state.direction, SortDirection::Desc);

        let entries = sample_entries();
        assert_eq!(ids(&state.apply(&entries, "rice")), vec!["4", "1"]);
    }
}
