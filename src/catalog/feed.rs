use crate::catalog::model::{EventWithMetrics, SortBy};

/// Compose the final display ordering from the filtered set.
///
/// In `date` mode the non-ad partition keeps the snapshot ordering (shuffled
/// sponsored first, then chronological regular content). Re-sorting here would
/// interleave sponsored and regular events by date, which is exactly the
/// behavior the snapshot exists to avoid. A single surviving ad is spliced in
/// at `ad_slot` (clamped to the list length).
///
/// In `popularity` mode the whole set, ads included, is stably sorted by likes
/// descending; the sponsorship-first rule is deliberately abandoned because the
/// user asked for a different ranking signal.
pub fn compose(
    filtered: Vec<EventWithMetrics>,
    sort: SortBy,
    ad_slot: usize,
) -> Vec<EventWithMetrics> {
    match sort {
        SortBy::Date => {
            let mut ads = Vec::new();
            let mut result = Vec::new();
            for item in filtered {
                if item.event.is_ad() {
                    ads.push(item);
                } else {
                    result.push(item);
                }
            }

            if let Some(ad) = ads.into_iter().next() {
                let idx = ad_slot.min(result.len());
                result.insert(idx, ad);
            }

            result
        }
        SortBy::Popularity => {
            let mut result = filtered;
            // Vec::sort_by is stable, so ties keep encounter order.
            result.sort_by(|a, b| b.likes.cmp(&a.likes));
            result
        }
    }
}
