//! Voronoi cells clipped to a bounding box.
//!
//! The cell of a site is the set of points at least as close to it as to
//! any other site. Starting from the bounding box, each cell is clipped by
//! the perpendicular-bisector half-plane of every other site. Cells are
//! returned in site order so callers can pair them with other per-station
//! data by index.

use geo::{Coord, LineString, Polygon, Rect};

/// Computes one Voronoi cell per site, bounded by `bbox`.
///
/// Entry `i` is `None` when site `i` coincides with an earlier site (the
/// earlier site owns the cell), when the box has zero width or height, or
/// when clipping leaves fewer than three vertices.
///
/// Every cell is clipped against every other site, so the cost is O(n²)
/// in the number of sites. A city with a few thousand stations pays this
/// once, when its layer is first built.
#[must_use]
pub fn voronoi_cells(sites: &[Coord<f64>], bbox: Rect<f64>) -> Vec<Option<Polygon<f64>>> {
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        log::debug!("Degenerate bounding box {bbox:?}, no Voronoi cells");
        return vec![None; sites.len()];
    }

    let (min, max) = (bbox.min(), bbox.max());
    let corners = vec![
        min,
        Coord { x: max.x, y: min.y },
        max,
        Coord { x: min.x, y: max.y },
    ];

    sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            if sites[..i].contains(site) {
                log::debug!("Site {i} duplicates an earlier site, no Voronoi cell");
                return None;
            }

            let mut ring = corners.clone();
            for other in sites.iter().filter(|other| *other != site) {
                ring = clip_to_nearer_half(&ring, *site, *other);
                if ring.len() < 3 {
                    return None;
                }
            }

            Some(Polygon::new(LineString::from(ring), vec![]))
        })
        .collect()
}

/// Clips a convex ring to the half-plane of points closer to `site` than
/// to `other` (Sutherland-Hodgman against the perpendicular bisector).
///
/// `ring` is open: its last vertex is not a repeat of the first.
fn clip_to_nearer_half(ring: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> Vec<Coord<f64>> {
    let normal = other - site;
    let mid = (site + other) / 2.0;
    // <= 0 on the site's side of the bisector
    let side = |p: Coord<f64>| (p.x - mid.x).mul_add(normal.x, (p.y - mid.y) * normal.y);

    let mut clipped = Vec::with_capacity(ring.len() + 1);

    for (k, &current) in ring.iter().enumerate() {
        let next = ring[(k + 1) % ring.len()];
        let (d_current, d_next) = (side(current), side(next));

        if d_current <= 0.0 {
            clipped.push(current);
        }
        if (d_current <= 0.0) != (d_next <= 0.0) {
            let t = d_current / (d_current - d_next);
            clipped.push(current + (next - current) * t);
        }
    }

    clipped.dedup();
    if clipped.len() > 1 && clipped.first() == clipped.last() {
        clipped.pop();
    }

    clipped
}
