use crate::catalog::model::{EventWithMetrics, FilterState, ListMode};
use crate::catalog::towns;

/// Evaluate one event against the active filter set.
///
/// Rules apply in order and short-circuit on the first rejection, with one
/// exception up front: in the generic feed (list mode `all`) advertisements
/// bypass every filter so they stay visible regardless of what the user
/// narrowed down to.
pub fn matches(item: &EventWithMetrics, filter: &FilterState) -> bool {
    let event = &item.event;

    if event.is_ad() && filter.list == ListMode::All {
        return true;
    }

    match filter.list {
        ListMode::All => {}
        ListMode::Favorites => {
            if !item.is_favorite {
                return false;
            }
        }
        ListMode::Attending => {
            if !item.is_attending {
                return false;
            }
        }
    }

    if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
        let q = query.to_lowercase();
        let matched = event.title.to_lowercase().contains(&q)
            || event.description.to_lowercase().contains(&q)
            || event.town.to_lowercase().contains(&q);
        if !matched {
            return false;
        }
    }

    if !filter.towns.is_empty() && !filter.towns.iter().any(|t| t == "all") {
        // Events carry town display names; the selection carries registry ids.
        match towns::by_name(&event.town) {
            Some(town) if filter.towns.iter().any(|t| t == town.id) => {}
            _ => return false,
        }
    }

    if !filter.categories.is_empty() && !filter.categories.contains(&event.category) {
        return false;
    }

    if let Some(start) = filter.start_date {
        match event.end_date {
            // Multi-day events survive while still ongoing at the bound.
            Some(end) => {
                if end < start {
                    return false;
                }
            }
            None => {
                if event.date < start {
                    return false;
                }
            }
        }
    }

    if let Some(end) = filter.end_date {
        if event.date > end {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::model::{Event, EventCategory, EventKind, SortBy};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item(id: &str, town: &str, category: EventCategory, kind: EventKind) -> EventWithMetrics {
        EventWithMetrics {
            event: Event {
                id: id.to_string(),
                title: format!("Título {id}"),
                description: "Descripción del evento".to_string(),
                town: town.to_string(),
                date: date("2025-12-20"),
                end_date: None,
                category,
                image_url: None,
                gallery_urls: None,
                interest_info: None,
                itinerary: None,
                sponsored: false,
                external_url: None,
                kind,
            },
            views: 500,
            likes: 50,
            attendees: 25,
            is_favorite: false,
            is_attending: false,
        }
    }

    fn unconstrained() -> FilterState {
        FilterState {
            query: None,
            towns: vec![],
            categories: vec![],
            start_date: None,
            end_date: None,
            sort: SortBy::Date,
            list: ListMode::All,
        }
    }

    #[test]
    fn test_zero_constraints_accept_everything_in_all_mode() {
        let filter = unconstrained();
        let regular = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);
        let ad = item("a1", "Galaroza", EventCategory::Otro, EventKind::Advertisement);

        assert!(matches(&regular, &filter));
        assert!(matches(&ad, &filter));
    }

    #[test]
    fn test_ads_rejected_outside_all_mode() {
        let mut filter = unconstrained();
        filter.list = ListMode::Favorites;
        let ad = item("a1", "Galaroza", EventCategory::Otro, EventKind::Advertisement);

        assert!(!matches(&ad, &filter));
    }

    #[test]
    fn test_ads_bypass_other_filters_in_all_mode() {
        let mut filter = unconstrained();
        filter.query = Some("no aparece en el anuncio".to_string());
        filter.towns = vec!["aracena".to_string()];
        let ad = item("a1", "Galaroza", EventCategory::Otro, EventKind::Advertisement);

        assert!(matches(&ad, &filter));
    }

    #[test]
    fn test_personal_list_modes() {
        let mut filter = unconstrained();
        filter.list = ListMode::Favorites;

        let mut fav = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);
        assert!(!matches(&fav, &filter));
        fav.is_favorite = true;
        assert!(matches(&fav, &filter));

        filter.list = ListMode::Attending;
        assert!(!matches(&fav, &filter));
        fav.is_attending = true;
        assert!(matches(&fav, &filter));
    }

    #[test]
    fn test_text_query_case_insensitive_over_title_description_town() {
        let mut filter = unconstrained();
        let it = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);

        filter.query = Some("TÍTULO".to_string());
        assert!(matches(&it, &filter));
        filter.query = Some("descripción".to_string());
        assert!(matches(&it, &filter));
        filter.query = Some("galaroza".to_string());
        assert!(matches(&it, &filter));
        filter.query = Some("zambomba".to_string());
        assert!(!matches(&it, &filter));
    }

    #[test]
    fn test_town_selection_resolves_by_registry_name() {
        let mut filter = unconstrained();
        filter.towns = vec!["aracena".to_string()];

        let in_town = item("e1", "Aracena", EventCategory::Otro, EventKind::Event);
        let other = item("e2", "Galaroza", EventCategory::Otro, EventKind::Event);
        let unknown = item("e3", "Sevilla", EventCategory::Otro, EventKind::Event);

        assert!(matches(&in_town, &filter));
        assert!(!matches(&other, &filter));
        // Unknown town name resolves to nothing and is rejected.
        assert!(!matches(&unknown, &filter));
    }

    #[test]
    fn test_all_sentinel_disables_town_filter() {
        let mut filter = unconstrained();
        filter.towns = vec!["all".to_string(), "aracena".to_string()];
        let it = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);

        assert!(matches(&it, &filter));
    }

    #[test]
    fn test_category_filter() {
        let mut filter = unconstrained();
        filter.categories = vec![EventCategory::BelenViviente];

        let belen = item("e1", "Galaroza", EventCategory::BelenViviente, EventKind::Event);
        let otro = item("e2", "Galaroza", EventCategory::Otro, EventKind::Event);

        assert!(matches(&belen, &filter));
        assert!(!matches(&otro, &filter));
    }

    #[test]
    fn test_start_date_overlap_semantics() {
        let mut multi = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);
        multi.event.date = date("2025-12-20");
        multi.event.end_date = Some(date("2025-12-26"));

        let mut filter = unconstrained();
        filter.start_date = Some(date("2025-12-24"));
        // Still ongoing at the bound: accepted.
        assert!(matches(&multi, &filter));

        filter.start_date = Some(date("2025-12-27"));
        // Finished before the bound: rejected.
        assert!(!matches(&multi, &filter));
    }

    #[test]
    fn test_single_day_start_bound() {
        let mut filter = unconstrained();
        filter.start_date = Some(date("2025-12-21"));
        let single = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);

        assert!(!matches(&single, &filter));
    }

    #[test]
    fn test_end_bound_rejects_later_starts() {
        let mut filter = unconstrained();
        filter.end_date = Some(date("2025-12-19"));
        let it = item("e1", "Galaroza", EventCategory::Otro, EventKind::Event);

        assert!(!matches(&it, &filter));

        filter.end_date = Some(date("2025-12-20"));
        assert!(matches(&it, &filter));
    }
}
