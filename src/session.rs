//! The interactive session: a single-threaded cooperative event loop that
//! serializes engine events, request settlements, and indicator ticks into
//! workflow transitions. Clicks and hover probes arrive as terminal commands
//! addressed in geographic coordinates.

use crate::client::ScoringClient;
use crate::config::AppConfig;
use crate::indicator::TICK_PERIOD;
use crate::picking::CellIndex;
use crate::surface::{MapSurface, TerminalEngine};
use crate::types::{LngLat, ScreenPoint};
use crate::workflow::{Workflow, WorkflowState};
use anyhow::{Context, Result};
use geojson::FeatureCollection;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Propose a candidate facility at the point (a map click).
    Simulate(LngLat),
    /// Hover probe: show the tooltip for the cell under the point.
    Probe(LngLat),
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    let point_from = |a: Option<&str>, b: Option<&str>| -> Option<LngLat> {
        let lng: f64 = a?.parse().ok()?;
        let lat: f64 = b?.parse().ok()?;
        Some(LngLat::new(lng, lat))
    };

    match head {
        "quit" | "exit" => Some(Command::Quit),
        "sim" | "click" => point_from(parts.next(), parts.next()).map(Command::Simulate),
        "probe" | "hover" => point_from(parts.next(), parts.next()).map(Command::Probe),
        // A bare "lng lat" pair counts as a click.
        _ => point_from(Some(head), parts.next()).map(Command::Simulate),
    }
}

pub async fn run(config: AppConfig) -> Result<()> {
    let client = ScoringClient::new(&config.service.base_url);

    println!("Fetching base overlay from {}...", config.service.base_url);
    let initial = client
        .fetch_overlay()
        .await
        .context("Failed to load the base underserved overlay")?;
    println!("Loaded overlay with {} cells", initial.features.len());

    let surface = MapSurface::new(TerminalEngine::new());
    let mut workflow = Workflow::new(surface, config.map.clone());
    workflow.overlay_loaded(initial);
    // The terminal engine reports ready synchronously.
    workflow.handle_ready();

    let mut index = workflow
        .overlay()
        .map(CellIndex::build)
        .unwrap_or_default();

    println!("Commands: sim <lng> <lat> | probe <lng> <lat> | quit");

    let (settle_tx, mut settle_rx) =
        mpsc::unbounded_channel::<(u64, Result<FeatureCollection>)>();
    // Acquired on entering Simulating, dropped on leaving it.
    let mut ticker: Option<Interval> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line.context("Failed to read from stdin")? {
                    Some(line) => line,
                    None => break, // EOF
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match parse_command(&line) {
                    Some(command) => command,
                    None => {
                        eprintln!("Unrecognized command: {}", line.trim());
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Simulate(point) => {
                        let ticket = workflow.handle_click(point);
                        if ticker.is_none() {
                            // First tick fires one period after entry.
                            ticker = Some(interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD));
                        }
                        let client = client.clone();
                        let settle_tx = settle_tx.clone();
                        tokio::spawn(async move {
                            let outcome = client.simulate(ticket.location).await;
                            let _ = settle_tx.send((ticket.token, outcome));
                        });
                    }
                    Command::Probe(point) => {
                        workflow.handle_hover(
                            ScreenPoint::new(point.lng, point.lat),
                            index.locate(point),
                        );
                        println!("{}", workflow.tooltip().text());
                        workflow.handle_leave();
                    }
                }
            }

            Some((token, outcome)) = settle_rx.recv() => {
                workflow.handle_settled(token, outcome);
                if workflow.state() == WorkflowState::Idle {
                    ticker = None;
                    if let Some(alert) = workflow.take_alert() {
                        println!();
                        eprintln!("{}", alert);
                    } else if let Some(overlay) = workflow.overlay() {
                        index = CellIndex::build(overlay);
                        println!();
                        println!("Overlay updated: {} cells", overlay.features.len());
                    }
                }
            }

            _ = async { ticker.as_mut().expect("guarded by is_some").tick().await },
                if ticker.is_some() =>
            {
                workflow.handle_tick();
                print!("\r{}   ", workflow.indicator().label());
                let _ = std::io::stdout().flush();
            }
        }
    }

    Ok(())
}
