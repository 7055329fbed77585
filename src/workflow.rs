//! The simulation workflow: the state machine that keeps overlay data, the
//! candidate marker, the in-flight request, and the loading indicator
//! mutually consistent. All shared handles live on this one controller; the
//! session loop dispatches events into it and performs the actual I/O.

use crate::config::MapConfig;
use crate::indicator::LoadingIndicator;
use crate::overlay::OverlayStore;
use crate::surface::{MapEngine, MapSurface};
use crate::tooltip::Tooltip;
use crate::types::{LngLat, ScreenPoint};
use geojson::FeatureCollection;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Simulating,
}

/// Handed to the session when a click starts a simulation: the request to
/// issue, tagged with a monotonically increasing token. Responses are applied
/// only if their token is still the latest, so a click during an outstanding
/// request supersedes it and the stale settlement is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationTicket {
    pub token: u64,
    pub location: LngLat,
}

pub struct Workflow<E: MapEngine> {
    surface: MapSurface<E>,
    map_config: MapConfig,
    store: OverlayStore,
    tooltip: Tooltip,
    indicator: LoadingIndicator,
    state: WorkflowState,
    candidate: Option<LngLat>,
    latest_token: u64,
    alert: Option<String>,
}

impl<E: MapEngine> Workflow<E> {
    pub fn new(surface: MapSurface<E>, map_config: MapConfig) -> Self {
        Workflow {
            surface,
            map_config,
            store: OverlayStore::new(),
            tooltip: Tooltip::new(),
            indicator: LoadingIndicator::new(),
            state: WorkflowState::Idle,
            candidate: None,
            latest_token: 0,
            alert: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn overlay(&self) -> Option<&FeatureCollection> {
        self.store.get()
    }

    pub fn candidate(&self) -> Option<LngLat> {
        self.candidate
    }

    pub fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn surface(&self) -> &MapSurface<E> {
        &self.surface
    }

    /// One-shot alert raised by a failed simulation, consumed by the session
    /// for display.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Initial overlay arrived: seed the store and start surface
    /// construction. Surface initialization stays deferred until a collection
    /// is present, so this is the only entry point for it.
    pub fn overlay_loaded(&mut self, collection: FeatureCollection) {
        self.store.set(collection);
        self.surface.initialize(&self.map_config);
    }

    /// Engine reported ready; register source and layers from the current
    /// overlay. Does nothing while the store is still absent.
    pub fn handle_ready(&mut self) {
        if let Some(collection) = self.store.get() {
            self.surface.handle_ready(collection);
        }
    }

    /// Map click at `point`: recenter, place the candidate marker, enter
    /// `Simulating`, and hand the session a tagged request to issue.
    pub fn handle_click(&mut self, point: LngLat) -> SimulationTicket {
        self.surface.fly_to(point);
        self.surface.place_marker(point);
        self.candidate = Some(point);

        self.state = WorkflowState::Simulating;
        self.indicator.set_visible(true);

        self.latest_token += 1;
        SimulationTicket {
            token: self.latest_token,
            location: point,
        }
    }

    /// A request settled. Superseded tokens are dropped entirely; for the
    /// latest token the loading state is cleared on every path before the
    /// outcome is applied.
    pub fn handle_settled(
        &mut self,
        token: u64,
        outcome: anyhow::Result<FeatureCollection>,
    ) {
        if token != self.latest_token {
            tracing::info!(token, latest = self.latest_token, "dropping superseded simulation response");
            return;
        }

        self.state = WorkflowState::Idle;
        self.indicator.set_visible(false);

        match outcome {
            Ok(collection) => {
                self.surface.replace_data(&collection);
                self.store.set(collection);
            }
            Err(err) => {
                tracing::error!(error = %err, "simulation request failed");
                self.alert = Some(format!("Simulation failed: {err:#}"));
            }
        }
    }

    /// Indicator animation tick; scheduled by the session only while
    /// `Simulating`.
    pub fn handle_tick(&mut self) {
        self.indicator.tick();
    }

    pub fn handle_hover(&mut self, pointer: ScreenPoint, properties: Option<&Map<String, Value>>) {
        self.tooltip.show(pointer, properties);
    }

    pub fn handle_leave(&mut self) {
        self.tooltip.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::fixtures;
    use crate::surface::testing::RecordingEngine;
    use anyhow::anyhow;

    fn workflow() -> Workflow<RecordingEngine> {
        let mut workflow = Workflow::new(
            MapSurface::new(RecordingEngine::new()),
            MapConfig::default(),
        );
        workflow.overlay_loaded(fixtures::collection(3));
        workflow.handle_ready();
        workflow
    }

    #[test]
    fn starts_idle_with_a_hidden_indicator() {
        let workflow = workflow();
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert!(!workflow.indicator().is_visible());
        assert!(workflow.candidate().is_none());
        assert!(workflow.surface().engine().markers.is_empty());
    }

    #[test]
    fn surface_initialization_waits_for_the_overlay() {
        let mut workflow = Workflow::new(
            MapSurface::new(RecordingEngine::new()),
            MapConfig::default(),
        );
        // No overlay yet: ready must not register anything.
        workflow.handle_ready();
        assert!(workflow.surface().engine().sources.is_empty());

        workflow.overlay_loaded(fixtures::collection(3));
        workflow.handle_ready();
        assert_eq!(workflow.surface().engine().sources.len(), 1);
        assert_eq!(
            workflow
                .surface()
                .engine()
                .source_data
                .as_ref()
                .unwrap()
                .features
                .len(),
            3
        );
    }

    #[test]
    fn click_places_one_marker_and_enters_simulating() {
        let mut workflow = workflow();
        let point = LngLat::new(24.94, 60.17);

        let ticket = workflow.handle_click(point);

        assert_eq!(ticket.location, point);
        assert_eq!(workflow.state(), WorkflowState::Simulating);
        assert!(workflow.indicator().is_visible());
        assert_eq!(workflow.candidate(), Some(point));

        let engine = workflow.surface().engine();
        assert_eq!(engine.markers.len(), 1);
        assert_eq!(engine.markers[0].position, point);
        assert_eq!(engine.fly_tos, vec![point]);
    }

    #[test]
    fn a_new_click_retires_the_previous_marker() {
        let mut workflow = workflow();
        workflow.handle_click(LngLat::new(24.94, 60.17));
        workflow.handle_click(LngLat::new(25.10, 60.25));

        let engine = workflow.surface().engine();
        assert_eq!(engine.markers.len(), 1);
        assert_eq!(engine.markers[0].position, LngLat::new(25.10, 60.25));
    }

    #[test]
    fn success_replaces_the_overlay_exactly() {
        let mut workflow = workflow();
        let ticket = workflow.handle_click(LngLat::new(24.94, 60.17));

        let response = fixtures::collection(1);
        workflow.handle_settled(ticket.token, Ok(response.clone()));

        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert!(!workflow.indicator().is_visible());
        assert_eq!(workflow.overlay().unwrap(), &response);
        assert_eq!(
            workflow
                .surface()
                .engine()
                .source_data
                .as_ref()
                .unwrap()
                .features
                .len(),
            1
        );
        assert!(workflow.take_alert().is_none());
    }

    #[test]
    fn failure_leaves_the_overlay_and_raises_an_alert() {
        let mut workflow = workflow();
        let before = workflow.overlay().unwrap().clone();
        let ticket = workflow.handle_click(LngLat::new(24.94, 60.17));

        workflow.handle_settled(ticket.token, Err(anyhow!("connection refused")));

        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert!(!workflow.indicator().is_visible());
        assert_eq!(workflow.overlay().unwrap(), &before);
        assert_eq!(workflow.surface().engine().data_updates, 0);

        let alert = workflow.take_alert().unwrap();
        assert!(alert.contains("Simulation failed"));
        // The alert is one-shot.
        assert!(workflow.take_alert().is_none());
    }

    #[test]
    fn indicator_tracks_the_workflow_state_across_a_full_cycle() {
        let mut workflow = workflow();
        assert_eq!(
            workflow.indicator().is_visible(),
            workflow.state() == WorkflowState::Simulating
        );

        let ticket = workflow.handle_click(LngLat::new(24.94, 60.17));
        assert_eq!(
            workflow.indicator().is_visible(),
            workflow.state() == WorkflowState::Simulating
        );

        workflow.handle_tick();
        assert_eq!(workflow.indicator().label(), "Simulating.");

        workflow.handle_settled(ticket.token, Ok(fixtures::collection(1)));
        assert_eq!(
            workflow.indicator().is_visible(),
            workflow.state() == WorkflowState::Simulating
        );
        assert_eq!(workflow.indicator().label(), "Simulating");
    }

    #[test]
    fn stale_settlement_is_dropped_entirely() {
        let mut workflow = workflow();
        let first = workflow.handle_click(LngLat::new(24.94, 60.17));
        let second = workflow.handle_click(LngLat::new(25.10, 60.25));
        assert_ne!(first.token, second.token);

        // The first response arrives late: it must not touch anything.
        workflow.handle_settled(first.token, Ok(fixtures::collection(9)));
        assert_eq!(workflow.state(), WorkflowState::Simulating);
        assert!(workflow.indicator().is_visible());
        assert_eq!(workflow.overlay().unwrap().features.len(), 3);

        // The latest response applies as usual.
        workflow.handle_settled(second.token, Ok(fixtures::collection(1)));
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert_eq!(workflow.overlay().unwrap().features.len(), 1);
        assert_eq!(
            workflow.surface().engine().markers[0].position,
            LngLat::new(25.10, 60.25)
        );
    }

    #[test]
    fn stale_failure_does_not_clear_the_loading_state() {
        let mut workflow = workflow();
        let first = workflow.handle_click(LngLat::new(24.94, 60.17));
        let _second = workflow.handle_click(LngLat::new(25.10, 60.25));

        workflow.handle_settled(first.token, Err(anyhow!("timed out")));
        assert_eq!(workflow.state(), WorkflowState::Simulating);
        assert!(workflow.indicator().is_visible());
        assert!(workflow.take_alert().is_none());
    }

    #[test]
    fn hover_and_leave_drive_the_tooltip() {
        let mut workflow = workflow();
        let properties = fixtures::collection(1).features[0].properties.clone().unwrap();

        workflow.handle_hover(ScreenPoint::new(40.0, 80.0), Some(&properties));
        assert!(workflow.tooltip().is_visible());
        assert_eq!(workflow.tooltip().position(), (55.0, 95.0));

        workflow.handle_leave();
        assert!(!workflow.tooltip().is_visible());
    }
}
