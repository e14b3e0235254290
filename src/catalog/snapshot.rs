use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::model::Event;

/// Immutable catalog snapshot built once at startup.
///
/// The master ordering is [shuffled sponsored] + [regular sorted by start date] +
/// [ads]. Sponsored events get a random rotation per process start so every
/// reload distributes prominence fairly; regular events stay chronological. The
/// feed composer relies on filters preserving this order, so nothing downstream
/// re-sorts it in date mode. Ads sit at the end only to mark presence; their
/// final position comes from the splice rule in the composer.
pub struct Catalog {
    master: Vec<Event>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn build<R: Rng + ?Sized>(events: Vec<Event>, rng: &mut R) -> Catalog {
        let mut sponsored = Vec::new();
        let mut regular = Vec::new();
        let mut ads = Vec::new();

        for event in events {
            if event.is_ad() {
                ads.push(event);
            } else if event.sponsored {
                sponsored.push(event);
            } else {
                regular.push(event);
            }
        }

        sponsored.shuffle(rng);
        regular.sort_by_key(|e| e.date);

        let mut master = sponsored;
        master.extend(regular);
        master.extend(ads);

        let by_id = master
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        Catalog { master, by_id }
    }

    /// The full master list in snapshot order.
    pub fn events(&self) -> &[Event] {
        &self.master
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.by_id.get(id).map(|&i| &self.master[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of real events (ads excluded), shown by the frontend counter.
    pub fn content_len(&self) -> usize {
        self.master.iter().filter(|e| !e.is_ad()).count()
    }
}
