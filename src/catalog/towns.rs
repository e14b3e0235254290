use serde::Serialize;

/// One entry of the fixed town registry. Coordinates feed the weather lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Town {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(skip)]
    pub lat: f64,
    #[serde(skip)]
    pub lon: f64,
}

/// Fixed registry of the district's towns. Events reference these by display
/// name, not by id, so filtering always goes through a name resolution step.
pub const TOWNS: &[Town] = &[
    Town { id: "aracena", name: "Aracena", lat: 37.891, lon: -6.561 },
    Town { id: "linares", name: "Linares de la Sierra", lat: 37.876, lon: -6.618 },
    Town { id: "higuera", name: "Higuera de la Sierra", lat: 37.834, lon: -6.443 },
    Town { id: "alajar", name: "Alájar", lat: 37.874, lon: -6.665 },
    Town { id: "almonaster", name: "Almonaster la Real", lat: 37.871, lon: -6.786 },
    Town { id: "puertomoral", name: "Puerto Moral", lat: 37.896, lon: -6.456 },
    Town { id: "fuenteheridos", name: "Fuenteheridos", lat: 37.904, lon: -6.661 },
    Town { id: "galaroza", name: "Galaroza", lat: 37.920, lon: -6.707 },
    Town { id: "cumbresmayores", name: "Cumbres Mayores", lat: 38.060, lon: -6.644 },
    Town { id: "losmarines", name: "Los Marines", lat: 37.900, lon: -6.606 },
    Town { id: "encinasola", name: "Encinasola", lat: 38.135, lon: -6.867 },
    Town { id: "aroche", name: "Aroche", lat: 37.941, lon: -6.957 },
    Town { id: "valdelarco", name: "Valdelarco", lat: 37.945, lon: -6.681 },
    Town { id: "rosal", name: "Rosal de la Frontera", lat: 37.967, lon: -7.221 },
    Town { id: "cortegana", name: "Cortegana", lat: 37.908, lon: -6.820 },
    Town { id: "castano", name: "Castaño del Robledo", lat: 37.893, lon: -6.704 },
    Town { id: "cala", name: "Cala", lat: 37.966, lon: -6.314 },
    Town { id: "santaolalla", name: "Santa Olalla del Cala", lat: 37.905, lon: -6.228 },
    Town { id: "hinojales", name: "Hinojales", lat: 38.004, lon: -6.587 },
    Town { id: "corteconcepcion", name: "Corteconcepción", lat: 37.909, lon: -6.505 },
    Town { id: "arroyomolinos", name: "Arroyomolinos de León", lat: 38.021, lon: -6.419 },
    Town { id: "cumbresbartolome", name: "Cumbres de San Bartolomé", lat: 38.065, lon: -6.784 },
];

/// Resolve an event's town name to its registry entry (exact display-name match,
/// the dataset invariant).
pub fn by_name(name: &str) -> Option<&'static Town> {
    TOWNS.iter().find(|t| t.name == name)
}

/// Case-insensitive lookup by id or display name. Used for deep links and
/// legacy query params, which may carry either form in any casing.
pub fn resolve(id_or_name: &str) -> Option<&'static Town> {
    let needle = id_or_name.trim().to_lowercase();
    TOWNS
        .iter()
        .find(|t| t.id.to_lowercase() == needle || t.name.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_exact() {
        assert_eq!(by_name("Aracena").unwrap().id, "aracena");
        assert!(by_name("aracena").is_none());
    }

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(resolve("ARACENA").unwrap().id, "aracena");
        assert_eq!(resolve("Castaño del Robledo").unwrap().id, "castano");
        assert_eq!(resolve("GALAROZA").unwrap().name, "Galaroza");
        assert!(resolve("sevilla").is_none());
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids: Vec<_> = TOWNS.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), TOWNS.len());
    }
}
