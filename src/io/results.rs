use crate::config::SchemeKind;
use serde::Serialize;

/// State of the reach at one output time (s since start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationResultPoint {
    pub time: f64,
    pub water_level: f64,
    pub discharge: f64,
}

// Which generator produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Storage,
    Fallback(SchemeKind),
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultSource::Storage => f.write_str("storage"),
            ResultSource::Fallback(kind) => write!(f, "fallback-{}", kind),
        }
    }
}

// Structure to hold one run's time series
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub source: ResultSource,
    pub points: Vec<SimulationResultPoint>,
}

impl SimulationResult {
    pub fn new(source: ResultSource, points: Vec<SimulationResultPoint>) -> Self {
        SimulationResult { source, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn peak_discharge(&self) -> Option<SimulationResultPoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.discharge.total_cmp(&b.discharge))
    }

    pub fn peak_water_level(&self) -> Option<SimulationResultPoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.water_level.total_cmp(&b.water_level))
    }

    pub fn final_point(&self) -> Option<SimulationResultPoint> {
        self.points.last().copied()
    }

    /// One-line summary for log output.
    pub fn summary(&self) -> String {
        match (self.peak_discharge(), self.peak_water_level(), self.final_point()) {
            (Some(q), Some(h), Some(last)) => format!(
                "{} points ({}), peak Q {:.3} m3/s at t={}s, peak h {:.3} m, final h {:.3} m / Q {:.3} m3/s",
                self.len(),
                self.source,
                q.discharge,
                q.time,
                h.water_level,
                last.water_level,
                last.discharge
            ),
            _ => format!("no points ({})", self.source),
        }
    }
}
