//! The overlay data store: the single source of truth for the scored cells
//! currently on screen, plus the decode paths for the two service endpoints.

use anyhow::{anyhow, Context, Result};
use geojson::{FeatureCollection, GeoJson};

/// Holds the current overlay collection. Absent until the first successful
/// load; afterwards replaced wholesale on every update, never merged.
#[derive(Debug, Default)]
pub struct OverlayStore {
    collection: Option<FeatureCollection>,
}

impl OverlayStore {
    pub fn new() -> Self {
        OverlayStore { collection: None }
    }

    pub fn get(&self) -> Option<&FeatureCollection> {
        self.collection.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.collection.is_some()
    }

    /// Replaces the whole collection. Partial feature updates do not exist.
    pub fn set(&mut self, collection: FeatureCollection) {
        self.collection = Some(collection);
    }
}

/// Parses the self-describing geojson text document returned by the initial
/// overlay load. The simulate endpoint returns structured JSON instead and
/// never goes through this step; the asymmetry is part of the service
/// contract.
pub fn parse_document(doc: &str) -> Result<FeatureCollection> {
    let geojson = doc
        .parse::<GeoJson>()
        .context("Failed to parse overlay document as GeoJSON")?;
    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(anyhow!("Overlay document must be a FeatureCollection")),
    }
}
