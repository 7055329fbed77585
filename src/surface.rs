//! Thin façade over the map rendering engine. The engine itself (projection,
//! tiles, rasterization) is an external collaborator reached through the
//! `MapEngine` trait; `MapSurface` owns one-time initialization and the
//! narrow mutations the workflow is allowed to perform.

use crate::config::MapConfig;
use crate::style::{
    FILL_OPACITY, MARKER_COLOR, OUTLINE_COLOR, OUTLINE_WIDTH, SCORE_RAMP,
};
use crate::types::{LngLat, ScreenPoint};
use geojson::FeatureCollection;

pub const SOURCE_ID: &str = "underserved";
pub const FILL_LAYER_ID: &str = "underserved-fill";
pub const OUTLINE_LAYER_ID: &str = "underserved-outline";

/// Camera speed for the fly-to animation.
pub const FLY_SPEED: f64 = 1.2;

/// Render instruction for the single candidate marker, anchored at its
/// bottom point and parented to the interactive canvas layer so it pans and
/// zooms with the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: LngLat,
    pub color: &'static str,
}

/// Operations the client needs from a rendering engine. Implementations are
/// expected to be single-threaded; no call here is reentrant.
pub trait MapEngine {
    fn load_style(&mut self, style: &str, center: LngLat, zoom: f64);
    fn add_source(&mut self, id: &str, data: &FeatureCollection);
    /// Fill layer colored by piecewise-linear interpolation over the ramp.
    fn add_fill_layer(&mut self, id: &str, source: &str, ramp: &[(f64, &str)], opacity: f64);
    fn add_line_layer(&mut self, id: &str, source: &str, color: &str, width: f64);
    fn set_source_data(&mut self, id: &str, data: &FeatureCollection);
    fn place_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self);
    fn fly_to(&mut self, center: LngLat, speed: f64);
    fn screen_to_lnglat(&self, point: ScreenPoint) -> LngLat;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfacePhase {
    New,
    WaitingForReady,
    Ready,
}

pub struct MapSurface<E: MapEngine> {
    engine: E,
    phase: SurfacePhase,
    /// Data pushed before the engine reported ready; flushed on ready.
    pending: Option<FeatureCollection>,
    has_marker: bool,
}

impl<E: MapEngine> MapSurface<E> {
    pub fn new(engine: E) -> Self {
        MapSurface {
            engine,
            phase: SurfacePhase::New,
            pending: None,
            has_marker: false,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Constructs the surface exactly once; calls while already initialized
    /// are no-ops. Source and layer registration happens on the engine's
    /// ready report, not here.
    pub fn initialize(&mut self, config: &MapConfig) {
        if self.phase != SurfacePhase::New {
            return;
        }
        self.engine
            .load_style(&config.style, config.center, config.zoom);
        self.phase = SurfacePhase::WaitingForReady;
    }

    /// Engine-reported ready: registers the geojson source and the two styled
    /// layers over it, then flushes any data queued in the meantime.
    pub fn handle_ready(&mut self, initial: &FeatureCollection) {
        if self.phase != SurfacePhase::WaitingForReady {
            return;
        }
        self.engine.add_source(SOURCE_ID, initial);
        self.engine
            .add_fill_layer(FILL_LAYER_ID, SOURCE_ID, &SCORE_RAMP, FILL_OPACITY);
        self.engine
            .add_line_layer(OUTLINE_LAYER_ID, SOURCE_ID, OUTLINE_COLOR, OUTLINE_WIDTH);
        self.phase = SurfacePhase::Ready;

        if let Some(pending) = self.pending.take() {
            self.engine.set_source_data(SOURCE_ID, &pending);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SurfacePhase::Ready
    }

    /// Pushes a replacement collection into the registered source. Queued
    /// (latest wins) when the surface is not ready yet.
    pub fn replace_data(&mut self, collection: &FeatureCollection) {
        if self.phase == SurfacePhase::Ready {
            self.engine.set_source_data(SOURCE_ID, collection);
        } else {
            self.pending = Some(collection.clone());
        }
    }

    /// Places the single candidate marker, retiring any previous one.
    /// Exactly one marker exists after this call.
    pub fn place_marker(&mut self, position: LngLat) {
        if self.has_marker {
            self.engine.remove_marker();
        }
        self.engine.place_marker(&Marker {
            position,
            color: MARKER_COLOR,
        });
        self.has_marker = true;
    }

    /// Non-blocking camera recenter.
    pub fn fly_to(&mut self, center: LngLat) {
        self.engine.fly_to(center, FLY_SPEED);
    }

    pub fn screen_to_lnglat(&self, point: ScreenPoint) -> LngLat {
        self.engine.screen_to_lnglat(point)
    }
}

/// Engine for the terminal front-end: logs the render operations and keeps
/// just enough state to answer coordinate conversions. The terminal addresses
/// the map directly in geographic coordinates, so screen-to-geographic is the
/// identity mapping.
#[derive(Debug, Default)]
pub struct TerminalEngine {
    feature_count: usize,
}

impl TerminalEngine {
    pub fn new() -> Self {
        TerminalEngine::default()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }
}

impl MapEngine for TerminalEngine {
    fn load_style(&mut self, style: &str, center: LngLat, zoom: f64) {
        tracing::info!(style, lng = center.lng, lat = center.lat, zoom, "map style loaded");
    }

    fn add_source(&mut self, id: &str, data: &FeatureCollection) {
        self.feature_count = data.features.len();
        tracing::info!(id, features = data.features.len(), "source registered");
    }

    fn add_fill_layer(&mut self, id: &str, source: &str, ramp: &[(f64, &str)], opacity: f64) {
        tracing::info!(id, source, stops = ramp.len(), opacity, "fill layer added");
    }

    fn add_line_layer(&mut self, id: &str, source: &str, color: &str, width: f64) {
        tracing::info!(id, source, color, width, "line layer added");
    }

    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) {
        self.feature_count = data.features.len();
        tracing::info!(id, features = data.features.len(), "source data replaced");
    }

    fn place_marker(&mut self, marker: &Marker) {
        tracing::info!(
            lng = marker.position.lng,
            lat = marker.position.lat,
            color = marker.color,
            "marker placed"
        );
    }

    fn remove_marker(&mut self) {
        tracing::info!("marker removed");
    }

    fn fly_to(&mut self, center: LngLat, speed: f64) {
        tracing::info!(lng = center.lng, lat = center.lat, speed, "camera recentered");
    }

    fn screen_to_lnglat(&self, point: ScreenPoint) -> LngLat {
        LngLat::new(point.x, point.y)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every engine operation so tests can assert on the rendered
    /// state: registered sources/layers, current source data, live markers,
    /// and camera moves.
    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub style_loads: usize,
        pub sources: Vec<String>,
        pub layers: Vec<String>,
        pub source_data: Option<FeatureCollection>,
        pub data_updates: usize,
        pub markers: Vec<Marker>,
        pub fly_tos: Vec<LngLat>,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            RecordingEngine::default()
        }
    }

    impl MapEngine for RecordingEngine {
        fn load_style(&mut self, _style: &str, _center: LngLat, _zoom: f64) {
            self.style_loads += 1;
        }

        fn add_source(&mut self, id: &str, data: &FeatureCollection) {
            self.sources.push(id.to_string());
            self.source_data = Some(data.clone());
        }

        fn add_fill_layer(&mut self, id: &str, _source: &str, _ramp: &[(f64, &str)], _opacity: f64) {
            self.layers.push(id.to_string());
        }

        fn add_line_layer(&mut self, id: &str, _source: &str, _color: &str, _width: f64) {
            self.layers.push(id.to_string());
        }

        fn set_source_data(&mut self, _id: &str, data: &FeatureCollection) {
            self.source_data = Some(data.clone());
            self.data_updates += 1;
        }

        fn place_marker(&mut self, marker: &Marker) {
            self.markers.push(*marker);
        }

        fn remove_marker(&mut self) {
            self.markers.pop();
        }

        fn fly_to(&mut self, center: LngLat, _speed: f64) {
            self.fly_tos.push(center);
        }

        fn screen_to_lnglat(&self, point: ScreenPoint) -> LngLat {
            LngLat::new(point.x, point.y)
        }
    }
}
