use chrono::NaiveDate;

use crate::catalog::model::EventCategory;
use crate::catalog::snapshot::Catalog;
use crate::catalog::towns;

/// Filter seed extracted from a share link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSeed {
    pub towns: Vec<String>,
    pub event_id: Option<String>,
}

/// What the client should do with its fragment after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentUpdate {
    Set(String),
    Clear,
    Keep,
}

fn strip_segment<'a>(fragment: &'a str, prefix: &str) -> Option<&'a str> {
    let (_, rest) = fragment.split_once(prefix)?;
    let segment = rest.split('/').next().unwrap_or(rest);
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Parse a share target into a filter seed.
///
/// Fragment paths win over the legacy query parameters: `#/pueblo/<id-or-name>`
/// selects one town (case-insensitive against id or display name),
/// `#/evento/<id>` pins a detail view, but only when the id actually exists in
/// the catalog. Unresolvable values are ignored and fall back to the plain
/// listing, never an error.
pub fn parse_share_target(
    fragment: &str,
    town_param: Option<&str>,
    event_param: Option<&str>,
    catalog: &Catalog,
) -> RouteSeed {
    let mut seed = RouteSeed::default();

    if let Some(raw) = strip_segment(fragment, "#/pueblo/") {
        let decoded = urlencoding::decode(raw).map(|d| d.into_owned());
        if let Ok(town) = decoded {
            if let Some(entry) = towns::resolve(&town) {
                seed.towns = vec![entry.id.to_string()];
            }
        }
    } else if let Some(raw) = strip_segment(fragment, "#/evento/") {
        let decoded = urlencoding::decode(raw).map(|d| d.into_owned());
        if let Ok(id) = decoded {
            if catalog.contains(&id) {
                seed.event_id = Some(id);
            }
        }
    } else if let Some(town) = town_param {
        if let Some(entry) = towns::resolve(town) {
            seed.towns = vec![entry.id.to_string()];
        }
    } else if let Some(id) = event_param {
        if catalog.contains(id) {
            seed.event_id = Some(id.to_string());
        }
    }

    seed
}

/// Canonical fragment for a given selection. Detail view wins; then a single
/// town; an empty selection clears the fragment. Multi-town selections are not
/// representable as a share link, so the fragment stays untouched.
pub fn fragment_for(selected_towns: &[String], detail: Option<&str>) -> FragmentUpdate {
    if let Some(id) = detail {
        return FragmentUpdate::Set(format!("#/evento/{id}"));
    }
    match selected_towns {
        [town] => FragmentUpdate::Set(format!("#/pueblo/{town}")),
        [] => FragmentUpdate::Clear,
        _ => FragmentUpdate::Keep,
    }
}

/// The listing/detail view state machine and the filter state it drags along.
///
/// Two states only: `listing` (fragment reflects town selection or nothing) and
/// `detail` (one event pinned, fragment reflects that event). Closing the
/// detail restores the previously selected single town's fragment, or clears.
#[derive(Debug, Clone, Default)]
pub struct RouteSync {
    pub towns: Vec<String>,
    pub detail: Option<String>,
    pub query: Option<String>,
    pub categories: Vec<EventCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RouteSync {
    pub fn seeded(seed: RouteSeed) -> Self {
        RouteSync {
            towns: seed.towns,
            detail: seed.event_id,
            ..Default::default()
        }
    }

    pub fn is_detail(&self) -> bool {
        self.detail.is_some()
    }

    /// listing -> detail.
    pub fn select_event(&mut self, id: &str) -> FragmentUpdate {
        self.detail = Some(id.to_string());
        FragmentUpdate::Set(format!("#/evento/{id}"))
    }

    /// detail -> listing, restoring the town fragment when exactly one town is
    /// selected.
    pub fn close_detail(&mut self) -> FragmentUpdate {
        self.detail = None;
        fragment_for(&self.towns, None)
    }

    /// React to external navigation (back/forward): re-parse the fragment and
    /// adopt its selection. A fully empty fragment is a return home and also
    /// resets the query, category and date-range filters; a town fragment
    /// leaves those alone.
    pub fn resync(&mut self, fragment: &str, catalog: &Catalog) {
        let seed = parse_share_target(fragment, None, None, catalog);
        let went_home =
            seed.towns.is_empty() && seed.event_id.is_none() && !fragment.contains("#/");

        self.towns = seed.towns;
        self.detail = seed.event_id;

        if went_home {
            self.query = None;
            self.categories.clear();
            self.start_date = None;
            self.end_date = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::catalog::model::{Event, EventKind};

    fn catalog() -> Catalog {
        let event = Event {
            id: "belen-galaroza".to_string(),
            title: "Belén Viviente".to_string(),
            description: String::new(),
            town: "Galaroza".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(),
            end_date: None,
            category: EventCategory::BelenViviente,
            image_url: None,
            gallery_urls: None,
            interest_info: None,
            itinerary: None,
            sponsored: false,
            external_url: None,
            kind: EventKind::Event,
        };
        let mut rng = StdRng::seed_from_u64(1);
        Catalog::build(vec![event], &mut rng)
    }

    #[test]
    fn test_parse_town_fragment_by_id_and_name() {
        let cat = catalog();

        let seed = parse_share_target("#/pueblo/aroche", None, None, &cat);
        assert_eq!(seed.towns, vec!["aroche".to_string()]);

        // Display name, any casing, percent-encoded.
        let seed = parse_share_target("#/pueblo/Casta%C3%B1o%20del%20Robledo", None, None, &cat);
        assert_eq!(seed.towns, vec!["castano".to_string()]);

        // Unresolvable towns are ignored, falling back to the plain listing.
        let seed = parse_share_target("#/pueblo/macondo", None, None, &cat);
        assert!(seed.towns.is_empty());
    }

    #[test]
    fn test_parse_event_fragment_requires_known_id() {
        let cat = catalog();

        let seed = parse_share_target("#/evento/belen-galaroza", None, None, &cat);
        assert_eq!(seed.event_id.as_deref(), Some("belen-galaroza"));

        let seed = parse_share_target("#/evento/no-such-event", None, None, &cat);
        assert_eq!(seed.event_id, None);
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let cat = catalog();
        let seed = parse_share_target("#/pueblo/galaroza/", None, None, &cat);
        assert_eq!(seed.towns, vec!["galaroza".to_string()]);
    }

    #[test]
    fn test_legacy_query_param_fallback() {
        let cat = catalog();

        let seed = parse_share_target("", Some("ARACENA"), None, &cat);
        assert_eq!(seed.towns, vec!["aracena".to_string()]);

        let seed = parse_share_target("", None, Some("belen-galaroza"), &cat);
        assert_eq!(seed.event_id.as_deref(), Some("belen-galaroza"));

        // Fragment wins over legacy params.
        let seed = parse_share_target("#/pueblo/cala", Some("aracena"), None, &cat);
        assert_eq!(seed.towns, vec!["cala".to_string()]);
    }

    #[test]
    fn test_deep_link_round_trip() {
        let cat = catalog();

        let towns = vec!["galaroza".to_string()];
        let update = fragment_for(&towns, None);
        let FragmentUpdate::Set(fragment) = update else {
            panic!("expected a fragment");
        };
        assert_eq!(fragment, "#/pueblo/galaroza");

        let seed = parse_share_target(&fragment, None, None, &cat);
        assert_eq!(seed.towns, towns);

        assert_eq!(fragment_for(&[], None), FragmentUpdate::Clear);
    }

    #[test]
    fn test_multi_town_selection_keeps_fragment() {
        let towns = vec!["galaroza".to_string(), "aracena".to_string()];
        assert_eq!(fragment_for(&towns, None), FragmentUpdate::Keep);
    }

    #[test]
    fn test_detail_transitions() {
        let mut sync = RouteSync {
            towns: vec!["galaroza".to_string()],
            ..Default::default()
        };

        let update = sync.select_event("belen-galaroza");
        assert!(sync.is_detail());
        assert_eq!(
            update,
            FragmentUpdate::Set("#/evento/belen-galaroza".to_string())
        );

        // Closing restores the single-town fragment.
        let update = sync.close_detail();
        assert!(!sync.is_detail());
        assert_eq!(update, FragmentUpdate::Set("#/pueblo/galaroza".to_string()));

        // Without a single town, closing clears instead.
        sync.towns.clear();
        sync.select_event("belen-galaroza");
        assert_eq!(sync.close_detail(), FragmentUpdate::Clear);
    }

    #[test]
    fn test_resync_home_resets_secondary_filters() {
        let cat = catalog();
        let mut sync = RouteSync {
            towns: vec!["galaroza".to_string()],
            query: Some("zambomba".to_string()),
            categories: vec![EventCategory::Fiesta],
            start_date: NaiveDate::from_ymd_opt(2025, 12, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            ..Default::default()
        };

        // Navigating to a town fragment keeps the secondary filters.
        sync.resync("#/pueblo/aracena", &cat);
        assert_eq!(sync.towns, vec!["aracena".to_string()]);
        assert!(sync.query.is_some());
        assert!(!sync.categories.is_empty());

        // Navigating home resets them.
        sync.resync("", &cat);
        assert!(sync.towns.is_empty());
        assert_eq!(sync.query, None);
        assert!(sync.categories.is_empty());
        assert_eq!(sync.start_date, None);
        assert_eq!(sync.end_date, None);
    }
}
