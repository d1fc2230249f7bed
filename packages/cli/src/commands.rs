//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use bikeshare_map_catchment::{CatchmentLayer, CatchmentOptions, build_catchments};
use bikeshare_map_city::{all_cities, find_city};
use bikeshare_map_hover::HoverController;
use bikeshare_map_loader::DatasetSource;

/// Prints every configured city.
pub fn list_cities() {
    println!("{:<10} {:<16} {:<22} {:>4} DATASET", "ID", "NAME", "CENTER", "ZOOM");
    println!("{}", "-".repeat(72));
    for city in all_cities() {
        println!(
            "{:<10} {:<16} {:<22} {:>4} {}",
            city.id,
            city.name,
            format!("{:.4}, {:.4}", city.center[0], city.center[1]),
            city.zoom,
            city.dataset
        );
    }
}

/// Loads a city's dataset and builds its catchments.
async fn load_layer(
    city_id: &str,
    options: &CatchmentOptions,
) -> Result<CatchmentLayer, Box<dyn std::error::Error>> {
    let city = find_city(city_id)?;
    let stations = DatasetSource::from_env()
        .load(&city)
        .await
        .inspect_err(|e| log::error!("Failed to load {} dataset: {e}", city.id))?;
    Ok(build_catchments(stations, options)?)
}

/// Builds a city's catchments and writes them as a `GeoJSON`
/// `FeatureCollection` to `output`, or to stdout.
pub async fn write_catchments(
    city_id: &str,
    output: Option<&Path>,
    options: &CatchmentOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let layer = load_layer(city_id, options).await?;
    let json = serde_json::to_string(&layer.to_feature_collection())?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!(
                "Wrote {} catchments to {}",
                layer.catchments.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Replays a hover over `station`'s catchment and prints the result.
pub async fn hover(
    city_id: &str,
    station: &str,
    options: &CatchmentOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let layer = load_layer(city_id, options).await?;
    let mut controller = HoverController::new(Arc::new(layer));
    controller.pointer_enter_station(station)?;

    for line in style_lines(&controller) {
        println!("{line}");
    }
    println!();
    println!("{}", controller.panel());

    Ok(())
}

/// One line per visible catchment, most opaque first.
fn style_lines(controller: &HoverController) -> Vec<String> {
    let mut visible: Vec<(&str, &bikeshare_map_hover::Style)> = controller
        .layer()
        .catchments
        .iter()
        .zip(controller.styles())
        .filter(|(_, style)| style.is_visible())
        .map(|(catchment, style)| (catchment.station.as_str(), style))
        .collect();

    visible.sort_by(|a, b| {
        b.1.fill_opacity
            .total_cmp(&a.1.fill_opacity)
            .then_with(|| a.0.cmp(b.0))
    });

    visible
        .into_iter()
        .map(|(station, style)| {
            format!(
                "{:<8} {:.1}  {station}",
                style.fill_color.unwrap_or_default(),
                style.fill_opacity
            )
        })
        .collect()
}
