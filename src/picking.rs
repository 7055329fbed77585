//! Point-in-cell lookup over the current overlay, used to resolve hover
//! probes to a cell's properties. Bounding boxes go into an R-tree; exact
//! containment is checked against the polygon afterwards.

use crate::types::LngLat;
use geo::algorithm::contains::Contains;
use geo::bounding_rect::BoundingRect;
use geo::{MultiPolygon, Point, Rect};
use geojson::FeatureCollection;
use rstar::{RTree, RTreeObject, AABB};
use serde_json::{Map, Value};
use std::convert::TryInto;

struct CellEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

struct Cell {
    geometry: MultiPolygon<f64>,
    properties: Map<String, Value>,
}

/// Spatial index over the overlay's polygon cells. Rebuilt whenever the
/// overlay collection is replaced.
#[derive(Default)]
pub struct CellIndex {
    cells: Vec<Cell>,
    tree: RTree<CellEnvelope>,
}

impl CellIndex {
    pub fn build(collection: &FeatureCollection) -> Self {
        let mut cells = Vec::new();

        for feature in &collection.features {
            let geometry = match &feature.geometry {
                Some(g) => g,
                None => continue,
            };
            let geo_geometry: geo::Geometry<f64> = match geometry.value.clone().try_into() {
                Ok(g) => g,
                Err(_) => continue,
            };
            let multi = match geo_geometry {
                geo::Geometry::MultiPolygon(mp) => mp,
                geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                _ => continue, // Skip points/lines
            };
            cells.push(Cell {
                geometry: multi,
                properties: feature.properties.clone().unwrap_or_default(),
            });
        }

        let envelopes: Vec<CellEnvelope> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let rect = cell.geometry.bounding_rect().unwrap_or(Rect::new(
                    geo::Coord { x: 0.0, y: 0.0 },
                    geo::Coord { x: 0.0, y: 0.0 },
                ));
                CellEnvelope {
                    index: i,
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                }
            })
            .collect();

        CellIndex {
            tree: RTree::bulk_load(envelopes),
            cells,
        }
    }

    /// Properties of the cell containing `location`, if any.
    pub fn locate(&self, location: LngLat) -> Option<&Map<String, Value>> {
        let point = Point::new(location.lng, location.lat);
        let envelope = AABB::from_point([location.lng, location.lat]);

        for candidate in self.tree.locate_in_envelope_intersecting(&envelope) {
            let cell = &self.cells[candidate.index];
            if cell.geometry.contains(&point) {
                return Some(&cell.properties);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
