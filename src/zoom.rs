//! Axis zoom state
//!
//! Zoom never touches the samples; it only scales the view bounds derived
//! from them.

use serde::Serialize;

/// Multiplicative zoom step
pub const ZOOM_STEP: f64 = 1.1;

/// Plot window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Bounds of the given coordinates, or `None` if either is empty
    pub fn of(x: &[f64], y: &[f64]) -> Option<Self> {
        let (x_min, x_max) = min_max(x)?;
        let (y_min, y_max) = min_max(y)?;
        Some(Self::new(x_min, x_max, y_min, y_max))
    }

    /// Every bound multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x_min: self.x_min * factor,
            x_max: self.x_max * factor,
            y_min: self.y_min * factor,
            y_max: self.y_max * factor,
        }
    }
}

/// Fixed window used for the ECG trace before scaling
pub const ECG_WINDOW: ViewBounds = ViewBounds {
    x_min: 500.0,
    x_max: 1500.0,
    y_min: 2150.0,
    y_max: 2200.0,
};

/// Scale factor applied to the view; starts at 1.0 and is never reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    scale_factor: f64,
    step: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(ZOOM_STEP)
    }
}

impl ZoomState {
    pub fn new(step: f64) -> Self {
        Self {
            scale_factor: 1.0,
            step,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Shrink the axes so the waveform appears larger
    pub fn zoom_in(&mut self) -> f64 {
        self.scale_factor /= self.step;
        self.scale_factor
    }

    /// Grow the axes so the waveform appears smaller
    pub fn zoom_out(&mut self) -> f64 {
        self.scale_factor *= self.step;
        self.scale_factor
    }

    /// View bounds of a generated signal: data min/max times the factor
    pub fn view_bounds(&self, x: &[f64], y: &[f64]) -> Option<ViewBounds> {
        ViewBounds::of(x, y).map(|b| b.scaled(self.scale_factor))
    }

    /// View bounds of the ECG trace: the fixed window times the factor
    pub fn ecg_view_bounds(&self, window: &ViewBounds) -> ViewBounds {
        window.scaled(self.scale_factor)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}
