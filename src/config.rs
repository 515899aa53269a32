use chrono::{NaiveDateTime, TimeDelta};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default reach length (m) used by the storage model when none is configured.
pub const DEFAULT_REACH_LENGTH: f64 = 1000.0;

/// Default number of rating curve samples.
pub const DEFAULT_RATING_SAMPLES: usize = 15;

/// Default bed slope (1:1000) for rating curves.
pub const DEFAULT_BED_SLOPE: f64 = 0.001;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("time step must be a positive finite number, got {0}")]
    NonPositiveTimeStep(f64),
    #[error("total steps must be at least 1")]
    ZeroSteps,
    #[error("reach length must be a positive finite number, got {0}")]
    NonPositiveReachLength(f64),
    #[error("bed slope must be a positive finite number, got {0}")]
    NonPositiveBedSlope(f64),
    #[error("end time {end} is before start time {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("run of {steps} steps of {time_step} s overflows the calendar from {start}")]
    TimeOverflow {
        start: NaiveDateTime,
        time_step: f64,
        steps: usize,
    },
}

// Configuration structure for store table and column name mapping
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    pub sections_table: String,
    pub points_table: String,
    pub results_table: String,
    pub project: String,
    pub node: String,
    pub n: String,
    pub water_level: String,
    pub design_water_level: String,
    pub design_discharge: String,
    pub seq: String,
    pub width: String,
    pub elevation: String,
}

impl ColumnConfig {
    pub fn new() -> Self {
        ColumnConfig {
            sections_table: "cross_sections".to_string(),
            points_table: "cross_section_points".to_string(),
            results_table: "simulation_results".to_string(),
            project: "project".to_string(),
            node: "node".to_string(),
            n: "manning_n".to_string(),
            water_level: "water_level".to_string(),
            design_water_level: "design_water_level".to_string(),
            design_discharge: "design_discharge".to_string(),
            seq: "seq".to_string(),
            width: "width".to_string(),
            elevation: "elevation".to_string(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Output format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Sqlite,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn writes_sqlite(self) -> bool {
        matches!(self, OutputFormat::Sqlite | OutputFormat::Both)
    }
}

/// Named shape used when no usable cross-section is available.
///
/// Parsing is lenient: anything that is not `lax` or `maccormack`
/// (case-insensitive) becomes `Upwind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SchemeKind {
    #[default]
    Upwind,
    Lax,
    MacCormack,
}

impl From<&str> for SchemeKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => SchemeKind::Lax,
            "maccormack" => SchemeKind::MacCormack,
            _ => SchemeKind::Upwind,
        }
    }
}

impl From<String> for SchemeKind {
    fn from(value: String) -> Self {
        SchemeKind::from(value.as_str())
    }
}

impl std::fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchemeKind::Upwind => "upwind",
            SchemeKind::Lax => "lax",
            SchemeKind::MacCormack => "maccormack",
        };
        f.write_str(name)
    }
}

/// Settings for a single reach simulation run.
///
/// Loaded from TOML; every field falls back to its default when omitted.
/// `courant_number` and `gravity` are carried for the caller but the storage
/// model does not use them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Step length in seconds
    pub time_step: f64,
    pub total_steps: usize,
    pub courant_number: f64,
    pub gravity: f64,
    /// c0 in Manning's equation (1.0 SI, 1.49 US customary)
    pub manning_constant: f64,
    pub scheme_kind: SchemeKind,
    /// Upstream inflow (m^3/s)
    pub inflow: f64,
    /// Downstream water level (m), held constant for the run
    pub downstream_stage: f64,
    pub reach_length: f64,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time_step: 60.0,
            total_steps: 500,
            courant_number: 0.8,
            gravity: 9.81,
            manning_constant: 1.0,
            scheme_kind: SchemeKind::Upwind,
            inflow: 10.0,
            downstream_stage: 0.0,
            reach_length: DEFAULT_REACH_LENGTH,
            start_time: NaiveDateTime::default(),
            end_time: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid simulation config: {:?}", path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ConfigError::NonPositiveTimeStep(self.time_step));
        }
        if self.total_steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if !(self.reach_length.is_finite() && self.reach_length > 0.0) {
            return Err(ConfigError::NonPositiveReachLength(self.reach_length));
        }
        let last = self.time_step * self.step_count() as f64;
        if self.timestamp_at(last).is_none() {
            return Err(ConfigError::TimeOverflow {
                start: self.start_time,
                time_step: self.time_step,
                steps: self.step_count(),
            });
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                return Err(ConfigError::EndBeforeStart {
                    start: self.start_time,
                    end,
                });
            }
        }
        Ok(())
    }

    /// Steps the solver will actually produce.
    pub fn step_count(&self) -> usize {
        self.total_steps.max(1)
    }

    /// Configured end time, or start plus the run length. `None` when the
    /// run length does not fit the calendar.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        match self.end_time {
            Some(end) => Some(end),
            None => self.timestamp_at(self.time_step * self.step_count() as f64),
        }
    }

    /// Wall-clock timestamp for a model time in seconds, `None` on overflow.
    pub fn timestamp_at(&self, time: f64) -> Option<NaiveDateTime> {
        let millis = (time * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.start_time.checked_add_signed(delta)
    }
}

/// Sampling options for rating curve generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingOptions {
    pub samples: usize,
    pub bed_slope: f64,
}

impl Default for RatingOptions {
    fn default() -> Self {
        RatingOptions {
            samples: DEFAULT_RATING_SAMPLES,
            bed_slope: DEFAULT_BED_SLOPE,
        }
    }
}

impl RatingOptions {
    pub fn new(samples: usize, bed_slope: f64) -> Result<Self, ConfigError> {
        if !(bed_slope.is_finite() && bed_slope > 0.0) {
            return Err(ConfigError::NonPositiveBedSlope(bed_slope));
        }
        Ok(RatingOptions { samples, bed_slope })
    }
}
