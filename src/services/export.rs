use crate::catalog::model::Event;

/// UTF-8 BOM so Excel renders tildes and eñes correctly.
const BOM: &str = "\u{FEFF}";

const HEADERS: [&str; 9] = [
    "ID",
    "Título",
    "Pueblo",
    "Fecha Inicio",
    "Fecha Fin",
    "Categoría",
    "Destacado",
    "URL Imagen",
    "Descripción",
];

/// Render the full catalog as a semicolon-separated CSV for the Spanish Excel
/// locale. The id cell gets a leading tab so Excel keeps it as text instead of
/// collapsing it into scientific notation.
pub fn events_to_csv(events: &[Event]) -> String {
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(HEADERS.join(";"));

    for event in events {
        let row = [
            format!("\"\t{}\"", event.id),
            format!("\"{}\"", clean(&event.title)),
            format!("\"{}\"", clean(&event.town)),
            event.date.format("%Y-%m-%d").to_string(),
            event
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            format!("\"{}\"", event.category.label()),
            if event.sponsored { "SÍ" } else { "NO" }.to_string(),
            format!("\"{}\"", event.image_url.as_deref().unwrap_or("")),
            format!("\"{}...\"", truncate(&clean(&event.description), 100)),
        ];
        lines.push(row.join(";"));
    }

    format!("{}{}", BOM, lines.join("\n"))
}

/// Date-stamped download filename.
pub fn export_filename(today: chrono::NaiveDate) -> String {
    format!("agenda_sierra_navidad_{}.csv", today.format("%Y-%m-%d"))
}

fn clean(value: &str) -> String {
    value.replace('"', "\"\"").replace('\n', " ")
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::model::{EventCategory, EventKind};

    fn event(id: &str, title: &str, description: &str) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            town: "Galaroza".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            end_date: None,
            category: EventCategory::BelenViviente,
            image_url: None,
            gallery_urls: None,
            interest_info: None,
            itinerary: None,
            sponsored: true,
            external_url: None,
            kind: EventKind::Event,
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_headers() {
        let csv = events_to_csv(&[]);
        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(
            csv.trim_start_matches('\u{FEFF}'),
            "ID;Título;Pueblo;Fecha Inicio;Fecha Fin;Categoría;Destacado;URL Imagen;Descripción"
        );
    }

    #[test]
    fn test_id_cell_is_tab_prefixed() {
        let csv = events_to_csv(&[event("16", "Belén", "desc")]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"\t16\";"));
        assert!(row.contains(";SÍ;"));
        assert!(row.contains("\"Belén Viviente\""));
    }

    #[test]
    fn test_quotes_are_doubled_and_newlines_flattened() {
        let csv = events_to_csv(&[event("e1", "El \"Gran\" Belén", "línea\nrota")]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"El \"\"Gran\"\" Belén\""));
        assert!(row.contains("línea rota"));
    }

    #[test]
    fn test_description_truncated_to_100_chars() {
        let long = "ñ".repeat(250);
        let csv = events_to_csv(&[event("e1", "t", &long)]);
        let row = csv.lines().nth(1).unwrap();
        let description_cell = row.rsplit(';').next().unwrap();
        // 100 chars + quotes + ellipsis marker
        assert_eq!(description_cell.chars().count(), 105);
        assert!(description_cell.ends_with("...\""));
    }

    #[test]
    fn test_export_filename_is_date_stamped() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(export_filename(today), "agenda_sierra_navidad_2025-12-24.csv");
    }
}
