//! Info panel HTML.
//!
//! The panel sits in a corner of the map. Idle, it shows how many stations
//! the city has; while a catchment is hovered, it lists the hovered
//! station's top destinations and its total trip count.

use std::fmt::Write as _;

use bikeshare_map_station_models::TripCounts;

/// Number of destinations listed in the focused panel.
pub const TOP_DESTINATIONS: usize = 5;

const DIVIDER: &str = "<hr style='border-top: 2px dotted #bbb;'>";

/// Explanatory paragraph shown under the focused panel.
pub const PANEL_DESCRIPTION: &str = "A heatmap of aggregate bike trips from a selected station, \
     answering the question of 'where do people bike from here'. \
     All the data are from the second half of 2020. \
     Each region roughly represents the area within half a mile from the bikeshare \
     station (i.e. places people would walk from/to).";

/// Panel shown while nothing is hovered.
#[must_use]
pub fn default_panel(station_count: usize) -> String {
    format!("<h5>{station_count} stations in total</h5>")
}

/// Panel shown while `station`'s catchment is hovered.
#[must_use]
pub fn render_panel(station: &str, trips: &TripCounts) -> String {
    let total: u64 = trips.values().sum();

    let mut html = format!("<h5>From {}</h5>{DIVIDER}", escape_html(station));

    if total == 0 {
        html.push_str("No trips");
    } else {
        for (name, count) in top_destinations(trips, TOP_DESTINATIONS) {
            let _ = write!(html, "<b>{count} </b>to {}<br />", escape_html(name));
        }
        let _ = write!(html, "<br /><b>{total} </b>to all stations<br />");
    }

    let _ = write!(html, "{DIVIDER}<p>{PANEL_DESCRIPTION}</p>");

    html
}

/// The `limit` destinations with the most trips, most first.
///
/// Ties are broken by destination name so the ranking is stable.
#[must_use]
pub fn top_destinations(trips: &TripCounts, limit: usize) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = trips
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);
    ranked
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
