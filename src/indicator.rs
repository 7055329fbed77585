//! Loading indicator shown while a simulation request is outstanding.
//! Visibility is a pure function of the workflow state; the dot animation is
//! advanced by a cooperative tick the session schedules only while visible.

use std::time::Duration;

pub const BASE_LABEL: &str = "Simulating";

/// The label grows by one dot per tick and resets once it reaches this length.
pub const MAX_LABEL_LEN: usize = 12;

pub const TICK_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct LoadingIndicator {
    visible: bool,
    label: String,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        LoadingIndicator::new()
    }
}

impl LoadingIndicator {
    pub fn new() -> Self {
        LoadingIndicator {
            visible: false,
            label: BASE_LABEL.to_string(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hiding also resets the animation so the next showing starts clean.
    pub fn set_visible(&mut self, visible: bool) {
        if !visible {
            self.label = BASE_LABEL.to_string();
        }
        self.visible = visible;
    }

    pub fn tick(&mut self) {
        if !self.visible {
            return;
        }
        if self.label.len() >= MAX_LABEL_LEN {
            self.label = BASE_LABEL.to_string();
        } else {
            self.label.push('.');
        }
    }
}
