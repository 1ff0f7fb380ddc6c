use serde::{Deserialize, Serialize};

use crate::config::{CVP_RADIUS_CAP, CVP_SLIDER_MAX, CVP_SOFT_CAP_SNAP, DEFAULT_CVP_RADIUS_FACTOR};

/// Slider model for the CVP radius factor.
///
/// Values above the cap are reachable only after a first attempt: crossing
/// `1.0` while locked snaps to `0.99` and unlocks the range up to `1.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusControl {
    value: f64,
    unlocked: bool,
}

impl Default for RadiusControl {
    fn default() -> Self {
        Self::new(DEFAULT_CVP_RADIUS_FACTOR)
    }
}

impl RadiusControl {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, CVP_RADIUS_CAP),
            unlocked: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Apply a slider input and return the value to hand to the engine.
    pub fn input(&mut self, raw: f64) -> f64 {
        let mut value = if raw.is_nan() { self.value } else { raw.clamp(0.0, CVP_SLIDER_MAX) };
        if !self.unlocked && value > CVP_RADIUS_CAP {
            value = CVP_SOFT_CAP_SNAP;
            self.unlocked = true;
            log::debug!("Radius slider snapped to {} and unlocked", value);
        }
        self.value = value;
        value
    }

    /// Lock the range again, e.g. when CVP is toggled. The value is kept.
    pub fn reset(&mut self) {
        self.unlocked = false;
    }
}
