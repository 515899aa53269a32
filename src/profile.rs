use crate::rating::RatingPoint;
use serde::{Deserialize, Serialize};

/// One surveyed point of a cross-section: horizontal offset and bed/bank elevation (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionPoint {
    pub width: f64,
    pub elevation: f64,
}

impl CrossSectionPoint {
    pub fn new(width: f64, elevation: f64) -> Self {
        CrossSectionPoint { width, elevation }
    }
}

/// Cross-section of a river node as supplied by the project store.
///
/// Points are kept in the order they were entered; geometry routines sort a
/// copy by width before use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossSectionProfile {
    pub points: Vec<CrossSectionPoint>,
    pub manning_n: Option<f64>,
    /// Reference water level (elevation)
    pub water_level: Option<f64>,
    pub design_water_level: Option<f64>,
    pub design_discharge: Option<f64>,
}

impl CrossSectionProfile {
    pub fn new(points: Vec<CrossSectionPoint>) -> Self {
        CrossSectionProfile {
            points,
            ..Default::default()
        }
    }

    pub fn with_manning_n(mut self, n: f64) -> Self {
        self.manning_n = Some(n);
        self
    }

    pub fn with_water_level(mut self, level: f64) -> Self {
        self.water_level = Some(level);
        self
    }

    /// Rectangular channel with ground at 0 and invert at `-depth`.
    pub fn rectangular(bottom_width: f64, depth: f64) -> Self {
        let z_bottom = -depth.abs();
        Self::new(vec![
            CrossSectionPoint::new(0.0, 0.0),
            CrossSectionPoint::new(0.0, z_bottom),
            CrossSectionPoint::new(bottom_width, z_bottom),
            CrossSectionPoint::new(bottom_width, 0.0),
        ])
    }

    /// Trapezoidal channel with side slope `side_slope` (horizontal per vertical).
    ///
    /// Without the bank tops only the two bottom corners are emitted.
    pub fn trapezoidal(
        bottom_width: f64,
        depth: f64,
        side_slope: f64,
        include_bank_top: bool,
    ) -> Self {
        let d = depth.abs();
        let side_width = side_slope.max(0.0) * d;
        let left_bottom = side_width;
        let right_bottom = side_width + bottom_width;

        let mut points = Vec::with_capacity(4);
        if include_bank_top {
            points.push(CrossSectionPoint::new(0.0, 0.0));
        }
        points.push(CrossSectionPoint::new(left_bottom, -d));
        points.push(CrossSectionPoint::new(right_bottom, -d));
        if include_bank_top {
            points.push(CrossSectionPoint::new(right_bottom + side_width, 0.0));
        }
        Self::new(points)
    }

    pub fn min_elevation(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::min)
    }

    pub fn max_elevation(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::max)
    }

    /// Manning n when it is set and positive.
    pub fn usable_manning_n(&self) -> Option<f64> {
        self.manning_n.filter(|n| *n > 0.0)
    }

    /// True when the storage model can run on this profile.
    pub fn has_usable_geometry(&self) -> bool {
        self.points.len() >= 2 && self.usable_manning_n().is_some()
    }

    /// Record a rating sample as the design point.
    pub fn with_design_point(mut self, point: &RatingPoint) -> Self {
        self.design_water_level = Some(point.water_level);
        self.design_discharge = Some(point.discharge);
        self
    }
}
