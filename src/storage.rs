//! Single-reach storage routing.
//!
//! The reach is lumped into one representative water level `h`:
//!
//!   dV/dt = Qin - Qout(h),  V = A(h) * L
//!   dh/dt = (Qin - Qout) / (L * T(h))
//!
//! with Qout from Manning's equation using the head difference to the fixed
//! downstream stage over the reach length as friction slope. Integrated with
//! explicit Euler at the configured time step.

use crate::config::SimulationConfig;
use crate::geometry::{ChannelGeometry, compute_geometry};
use crate::io::results::SimulationResultPoint;
use crate::profile::CrossSectionProfile;
use crate::rating::manning_discharge;
use crate::state::ReachState;

/// Floor for top width and wetted perimeter (m).
const MIN_WIDTH: f64 = 0.01;
/// Below this area (m^2) the channel is treated as dry.
const DRY_AREA: f64 = 1e-6;
/// Lower bound on the friction slope.
const MIN_SLOPE: f64 = 1e-5;
/// Initial level is kept this far above the invert (m).
const START_CLEARANCE: f64 = 0.01;

/// Initial level: reference level, then design level, then downstream stage,
/// kept above the channel invert.
pub fn initial_water_level(config: &SimulationConfig, profile: &CrossSectionProfile) -> f64 {
    let min_bed = profile.min_elevation().unwrap_or(0.0);
    let h0 = profile
        .water_level
        .or(profile.design_water_level)
        .unwrap_or(config.downstream_stage);
    h0.max(min_bed + START_CLEARANCE)
}

/// Outflow for the current level. Zero when the section is dry.
pub fn outflow(
    config: &SimulationConfig,
    geom: &ChannelGeometry,
    manning_n: f64,
    water_level: f64,
) -> f64 {
    if geom.area < DRY_AREA {
        return 0.0;
    }
    let slope = ((water_level - config.downstream_stage) / config.reach_length).max(MIN_SLOPE);
    manning_discharge(config.manning_constant, manning_n, geom, slope).max(0.0)
}

/// Run the storage model for `total_steps` steps (at least one).
///
/// Each recorded point holds the state at the start of its step, so the first
/// point is the initial condition.
pub fn run_storage_model(
    config: &SimulationConfig,
    profile: &CrossSectionProfile,
    manning_n: f64,
) -> Vec<SimulationResultPoint> {
    let dt = config.time_step;
    let n_steps = config.step_count();
    let reach_length = config.reach_length;
    let min_bed = profile.min_elevation().unwrap_or(0.0);

    let mut state = ReachState::new(initial_water_level(config, profile));
    let mut points = Vec::with_capacity(n_steps);

    log::debug!(
        "Storage model: h0 = {:.4}, h_down = {:.4}, L = {}, n = {}, steps = {}",
        state.water_level,
        config.downstream_stage,
        reach_length,
        manning_n,
        n_steps
    );

    for i in 0..n_steps {
        let t = i as f64 * dt;
        let h = state.water_level;

        let mut geom = compute_geometry(&profile.points, h);
        geom.top_width = geom.top_width.max(MIN_WIDTH);
        geom.wetted_perimeter = geom.wetted_perimeter.max(MIN_WIDTH);

        let q_out = outflow(config, &geom, manning_n, h);

        points.push(SimulationResultPoint {
            time: t,
            water_level: h,
            discharge: q_out,
        });

        // mass balance, explicit Euler
        let dh_dt = (config.inflow - q_out) / (reach_length * geom.top_width);
        let h_next = (h + dt * dh_dt).max(min_bed);

        log::trace!("step {i}: t = {t}, h = {h:.5}, Qout = {q_out:.5}, dh/dt = {dh_dt:.3e}");
        state.update(h_next);
    }

    points
}
