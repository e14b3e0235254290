use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::warn;

use crate::catalog::model::{Event, EventWithMetrics};
use crate::db::{InteractionRecord, InteractionRepository};

// ============================================================================
// Deterministic base metrics
// ============================================================================

/// 32-bit signed string hash (h = h * 31 + unit), matching the reference
/// deployment so the displayed numbers stay identical across devices and
/// reloads. No server-side counters exist; this is a documented placeholder
/// for a future real analytics backend. Do not change the constants.
fn seed_hash(id: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in id.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash.unsigned_abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseMetrics {
    pub views: u32,
    pub likes: u32,
    pub attendees: u32,
}

/// Derive plausible-looking engagement counters from an event id alone.
/// Views land between 150 and 1999; likes at 10-19% of views; attendees at
/// 5-14% of views.
pub fn base_metrics(id: &str) -> BaseMetrics {
    let seed = seed_hash(id);

    let views = seed % 1850 + 150;
    let likes = views * (seed % 10 + 10) / 100;
    let attendees = views * (seed % 10 + 5) / 100;

    BaseMetrics {
        views,
        likes,
        attendees,
    }
}

// ============================================================================
// Engagement service
// ============================================================================

/// Layers a device's interaction record over the deterministic base metrics.
///
/// This is the single place where storage failures are absorbed: every
/// operation answers as if the toggle took effect, logs at warn level, and
/// simply loses persistence for the session. Callers never see an error.
#[derive(Clone)]
pub struct EngagementService {
    pool: SqlitePool,
}

impl EngagementService {
    pub fn new(pool: SqlitePool) -> Self {
        EngagementService { pool }
    }

    /// Metrics for a single event.
    pub async fn metrics_for(&self, event: &Event, device_id: &str) -> EventWithMetrics {
        let record = match InteractionRepository::find(&self.pool, device_id, &event.id).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Interaction store read failed for {}: {:?}", event.id, e);
                None
            }
        };
        overlay(event.clone(), record.as_ref())
    }

    /// Metrics for a whole list, with one store read for the device.
    pub async fn decorate(&self, events: &[Event], device_id: &str) -> Vec<EventWithMetrics> {
        let records: HashMap<String, InteractionRecord> =
            match InteractionRepository::find_by_device(&self.pool, device_id).await {
                Ok(rows) => rows.into_iter().map(|r| (r.event_id.clone(), r)).collect(),
                Err(e) => {
                    warn!("Interaction store read failed for device: {:?}", e);
                    HashMap::new()
                }
            };

        events
            .iter()
            .map(|event| overlay(event.clone(), records.get(&event.id)))
            .collect()
    }

    /// Flip the like flag, returning the new state. The caller adjusts the
    /// displayed count by ±1 instead of re-deriving the whole base.
    pub async fn toggle_like(&self, device_id: &str, event_id: &str) -> bool {
        match InteractionRepository::toggle_like(&self.pool, device_id, event_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!("Like toggle not persisted for {}: {:?}", event_id, e);
                // With no readable prior state, behave like a first toggle.
                true
            }
        }
    }

    /// Flip the attending flag, returning the new state.
    pub async fn toggle_attend(&self, device_id: &str, event_id: &str) -> bool {
        match InteractionRepository::toggle_attend(&self.pool, device_id, event_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!("Attend toggle not persisted for {}: {:?}", event_id, e);
                true
            }
        }
    }

    /// Record the first view. Returns true when the counter should be bumped.
    pub async fn record_view(&self, device_id: &str, event_id: &str) -> bool {
        match InteractionRepository::mark_viewed(&self.pool, device_id, event_id).await {
            Ok(bumped) => bumped,
            Err(e) => {
                warn!("View not persisted for {}: {:?}", event_id, e);
                true
            }
        }
    }
}

fn overlay(event: Event, record: Option<&InteractionRecord>) -> EventWithMetrics {
    let base = base_metrics(&event.id);

    let liked = record.map(|r| r.liked).unwrap_or(false);
    let attending = record.map(|r| r.attending).unwrap_or(false);
    let viewed = record.map(|r| r.viewed).unwrap_or(false);

    EventWithMetrics {
        event,
        views: base.views + u32::from(viewed),
        likes: base.likes + u32::from(liked),
        attendees: base.attendees + u32::from(attending),
        is_favorite: liked,
        is_attending: attending,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::model::{EventCategory, EventKind};

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            town: "Aracena".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            end_date: None,
            category: EventCategory::Otro,
            image_url: None,
            gallery_urls: None,
            interest_info: None,
            itinerary: None,
            sponsored: false,
            external_url: None,
            kind: EventKind::Event,
        }
    }

    async fn service() -> EngagementService {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        EngagementService::new(pool)
    }

    #[test]
    fn test_base_metrics_are_deterministic() {
        let a = base_metrics("belen-galaroza");
        let b = base_metrics("belen-galaroza");
        assert_eq!(a, b);
        assert_ne!(base_metrics("belen-galaroza"), base_metrics("otro-evento"));
    }

    #[test]
    fn test_base_metrics_ranges() {
        for id in ["16", "belen-galaroza", "ad-dino", "ruta-amantes-galaroza"] {
            let m = base_metrics(id);
            assert!((150..2000).contains(&m.views), "views out of range for {id}");
            assert!(m.likes <= m.views / 5, "likes too high for {id}");
            assert!(m.attendees <= m.views * 14 / 100 + 1);
            assert!(m.likes >= m.views / 10);
        }
    }

    #[tokio::test]
    async fn test_metrics_stable_without_toggles() {
        let svc = service().await;
        let ev = event("e1");

        let a = svc.metrics_for(&ev, "dev").await;
        let b = svc.metrics_for(&ev, "dev").await;
        assert_eq!(a.views, b.views);
        assert_eq!(a.likes, b.likes);
        assert_eq!(a.attendees, b.attendees);
    }

    #[tokio::test]
    async fn test_like_unlike_restores_counts() {
        let svc = service().await;
        let ev = event("e1");

        let before = svc.metrics_for(&ev, "dev").await;

        assert!(svc.toggle_like("dev", "e1").await);
        let liked = svc.metrics_for(&ev, "dev").await;
        assert_eq!(liked.likes, before.likes + 1);
        assert!(liked.is_favorite);

        assert!(!svc.toggle_like("dev", "e1").await);
        let after = svc.metrics_for(&ev, "dev").await;
        assert_eq!(after.likes, before.likes);
        assert!(!after.is_favorite);
    }

    #[tokio::test]
    async fn test_view_bumps_once() {
        let svc = service().await;
        let ev = event("e1");
        let before = svc.metrics_for(&ev, "dev").await;

        assert!(svc.record_view("dev", "e1").await);
        assert!(!svc.record_view("dev", "e1").await);

        let after = svc.metrics_for(&ev, "dev").await;
        assert_eq!(after.views, before.views + 1);
    }

    #[tokio::test]
    async fn test_decorate_overlays_per_event() {
        let svc = service().await;
        svc.toggle_attend("dev", "e2").await;

        let events = vec![event("e1"), event("e2")];
        let decorated = svc.decorate(&events, "dev").await;

        assert!(!decorated[0].is_attending);
        assert!(decorated[1].is_attending);
        assert_eq!(decorated[1].attendees, base_metrics("e2").attendees + 1);
    }
}
