//! Hover tooltip for scored cells. One panel exists for the lifetime of the
//! map surface; it is repositioned and refilled per hover, hidden on leave.

use crate::types::ScreenPoint;
use serde_json::{Map, Value};

/// Offset from the pointer, applied on both axes.
pub const POINTER_OFFSET_PX: f64 = 15.0;

#[derive(Debug, Default)]
pub struct Tooltip {
    visible: bool,
    text: String,
    position: (f64, f64),
}

impl Tooltip {
    pub fn new() -> Self {
        Tooltip::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Fills and shows the panel for the hovered cell. Missing or malformed
    /// properties render as zero; hovering never fails.
    pub fn show(&mut self, pointer: ScreenPoint, properties: Option<&Map<String, Value>>) {
        let population = property_number(properties, "population");
        let distance_km = property_number(properties, "dist_to_hospital_m") / 1000.0;
        let score = property_number(properties, "underserved_score");

        self.text = format!(
            "Population: {}\nDistance: {:.0} km\nScore: {}",
            group_thousands(population),
            distance_km,
            group_thousands(score),
        );
        self.position = (
            pointer.x + POINTER_OFFSET_PX,
            pointer.y + POINTER_OFFSET_PX,
        );
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Numeric property lookup tolerating numbers, numeric strings, and absence.
fn property_number(properties: Option<&Map<String, Value>>, key: &str) -> f64 {
    let value = match properties.and_then(|p| p.get(key)) {
        Some(v) => v,
        None => return 0.0,
    };
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
