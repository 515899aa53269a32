//! Placeholder series used when a node has no usable cross-section.
//!
//! The shapes are named after finite-difference schemes but none of them
//! discretises anything; they only give the results view a plausible curve
//! built from the inflow and downstream stage.

use crate::config::{SchemeKind, SimulationConfig};
use crate::io::results::SimulationResultPoint;
use std::f64::consts::PI;

/// Steps per oscillation of the lax shape.
const LAX_PERIOD: f64 = 80.0;

pub fn generate(config: &SimulationConfig, kind: SchemeKind) -> Vec<SimulationResultPoint> {
    match kind {
        SchemeKind::Upwind => upwind_shape(config),
        SchemeKind::Lax => lax_shape(config),
        SchemeKind::MacCormack => maccormack_shape(config),
    }
}

fn build<F>(config: &SimulationConfig, shape: F) -> Vec<SimulationResultPoint>
where
    F: Fn(usize, usize) -> (f64, f64),
{
    let n_steps = config.step_count();
    (0..n_steps)
        .map(|i| {
            let (discharge, water_level) = shape(i, n_steps);
            SimulationResultPoint {
                time: i as f64 * config.time_step,
                water_level,
                discharge,
            }
        })
        .collect()
}

/// Ease from 70% to 100% of inflow, stage rising 0.3.
pub fn upwind_shape(config: &SimulationConfig) -> Vec<SimulationResultPoint> {
    build(config, |i, n| {
        let frac = (i as f64 / n as f64).min(1.0);
        (
            config.inflow * (0.7 + 0.3 * frac),
            config.downstream_stage + 0.3 * frac,
        )
    })
}

/// +-15% inflow and +-0.25 stage oscillation, stage leading by a quarter period.
pub fn lax_shape(config: &SimulationConfig) -> Vec<SimulationResultPoint> {
    build(config, |i, _| {
        let phase = 2.0 * PI * i as f64 / LAX_PERIOD;
        (
            config.inflow * (1.0 + 0.15 * phase.sin()),
            config.downstream_stage + 0.25 * (phase + PI / 4.0).sin(),
        )
    })
}

/// Gaussian pulse centred at a third of the run.
pub fn maccormack_shape(config: &SimulationConfig) -> Vec<SimulationResultPoint> {
    build(config, |i, n| {
        let peak = (n / 3) as f64;
        let sigma = n as f64 / 10.0;
        let x = i as f64 - peak;
        let pulse = (-0.5 * x * x / (sigma * sigma)).exp();
        (
            config.inflow * (0.8 + 0.6 * pulse),
            config.downstream_stage + 0.4 * pulse,
        )
    })
}
