use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::model::{EventCategory, EventWithMetrics};
use crate::catalog::towns::{self, TOWNS};

#[derive(Debug, Clone, Serialize)]
pub struct TownCount {
    pub id: &'static str,
    pub name: &'static str,
    pub count: usize,
}

/// Count the currently displayed events per town id. Events whose town name has
/// no registry entry contribute nothing.
pub fn town_counts(items: &[EventWithMetrics]) -> HashMap<&'static str, usize> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for item in items {
        if let Some(town) = towns::by_name(&item.event.town) {
            *counts.entry(town.id).or_insert(0) += 1;
        }
    }
    counts
}

/// Full registry ranked for the town picker: count descending, ties broken
/// alphabetically by display name. Towns without matches stay in the list with
/// a zero count so their checkboxes still render.
pub fn ranked_towns(items: &[EventWithMetrics]) -> Vec<TownCount> {
    let counts = town_counts(items);

    let mut ranked: Vec<TownCount> = TOWNS
        .iter()
        .map(|t| TownCount {
            id: t.id,
            name: t.name,
            count: counts.get(t.id).copied().unwrap_or(0),
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(b.name)));
    ranked
}

/// Categories worth showing as filter options: those present in the filtered
/// set, plus any the user already selected even when it currently yields zero
/// results, so it can still be deselected. Canonical enum order.
pub fn available_categories(
    items: &[EventWithMetrics],
    selected: &[EventCategory],
) -> Vec<EventCategory> {
    EventCategory::ALL
        .into_iter()
        .filter(|cat| {
            selected.contains(cat) || items.iter().any(|i| i.event.category == *cat)
        })
        .collect()
}
