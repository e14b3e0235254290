use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::model::{Event, EventKind};

/// Load the event dataset from a JSON file.
///
/// Two things are normalized at this boundary only:
/// - legacy `ad-` id prefixes are migrated to the explicit `kind` tag;
/// - rows violating the `end_date >= date` invariant are dropped with a warning.
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event dataset {}", path.display()))?;

    let parsed: Vec<Event> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse event dataset {}", path.display()))?;

    let total = parsed.len();
    let events: Vec<Event> = parsed
        .into_iter()
        .filter_map(|mut event| {
            if let Some(end) = event.end_date {
                if end < event.date {
                    tracing::warn!(
                        "Dropping event {}: end date {} precedes start date {}",
                        event.id,
                        end,
                        event.date
                    );
                    return None;
                }
            }

            // Legacy datasets tag advertisements by id prefix.
            if event.kind == EventKind::Event && event.id.starts_with("ad-") {
                event.kind = EventKind::Advertisement;
            }

            Some(event)
        })
        .collect();

    if events.len() < total {
        tracing::warn!("Dataset loaded with {} invalid rows skipped", total - events.len());
    }
    tracing::info!("Loaded {} events from {}", events.len(), path.display());

    Ok(events)
}
