//! Entry point that turns a configuration into a report.

use serde::Serialize;

use crate::characteristics::Characteristic;
use crate::config::{SimulationConfig, SimulationKind};
use crate::errors::{CharacteristicError, ConfigurationError};
use crate::hardpoints::{HardpointSet, TopologyKind};
use crate::simulation::{JackingSample, JackingSimulation, SweepResult, WheelAttitudeSimulation};
use crate::step::Step;
use crate::vehicle::{AxleEnd, CornerId, Vehicle};

/// Values of one characteristic over the solved travel values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    /// Characteristic the values belong to.
    pub characteristic: Characteristic,
    /// `(travel, value)` pairs in sweep order.
    pub samples: Vec<(f64, f64)>,
}

/// Travel value that could not be solved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapReport {
    /// Requested travel in millimetres.
    pub travel: f64,
    /// Reason the solve failed.
    pub reason: String,
}

/// Characteristic that was requested but not reported.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Omission {
    /// Corner the characteristic was requested for.
    pub corner: CornerId,
    /// Omitted characteristic.
    pub characteristic: Characteristic,
    /// Why it was omitted.
    pub reason: String,
}

/// Results for one simulated corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CornerReport {
    /// Simulated corner.
    pub corner: CornerId,
    /// Solved steps in sweep order.
    #[serde(skip)]
    pub steps: Vec<Step>,
    /// Travel values that produced no step.
    pub gaps: Vec<GapReport>,
    /// One series per reported characteristic.
    pub series: Vec<Series>,
    /// Solved point sets per step, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<HardpointSet>>,
}

impl CornerReport {
    /// Series of `characteristic`, if it was reported.
    #[must_use]
    pub fn series(&self, characteristic: Characteristic) -> Option<&Series> {
        self.series
            .iter()
            .find(|series| series.characteristic == characteristic)
    }
}

/// Everything a run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Driver that produced the report.
    pub simulation: SimulationKind,
    /// One entry per simulated corner, left before right.
    pub corners: Vec<CornerReport>,
    /// Coupled roll-centre and jacking samples (jacking runs only).
    pub jacking: Vec<JackingSample>,
    /// Requested characteristics that were not reported.
    pub omitted: Vec<Omission>,
}

impl SimulationReport {
    /// Report of `corner`, if it was simulated.
    #[must_use]
    pub fn corner(&self, corner: CornerId) -> Option<&CornerReport> {
        self.corners.iter().find(|report| report.corner == corner)
    }
}

/// Run the simulation described by `config` on `vehicle`.
///
/// Wheel-attitude runs sweep the corner selected by the configured side and
/// half. Jacking runs sweep both corners of the half. Characteristics that do
/// not apply to a corner are listed in [`SimulationReport::omitted`].
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidSweep`] when the travel sweep is
/// invalid. Unreachable travel values never fail the run.
pub fn run_simulation(
    vehicle: &Vehicle,
    config: &SimulationConfig,
) -> Result<SimulationReport, ConfigurationError> {
    config.travel.validate()?;
    let requested = config.plots.requested();
    let mut omitted = Vec::new();
    let (sweeps, jacking) = match config.simulation {
        SimulationKind::WheelAttitude => {
            let corner = vehicle.corner(config.corner());
            let sweep = WheelAttitudeSimulation::new(config.travel).run(corner)?;
            (vec![sweep], Vec::new())
        }
        SimulationKind::Jacking => {
            let result = JackingSimulation::new(config.travel, config.jacking_motion)
                .run(vehicle, config.half)?;
            (vec![result.left, result.right], result.coupled)
        }
    };
    let corners = sweeps
        .into_iter()
        .map(|sweep| {
            let topology = vehicle.corner(sweep.corner).topology().kind();
            corner_report(sweep, topology, &requested, config.plots.three_d, &mut omitted)
        })
        .collect();
    Ok(SimulationReport {
        simulation: config.simulation,
        corners,
        jacking,
        omitted,
    })
}

/// Turn one corner sweep into its report, filing omitted characteristics.
fn corner_report(
    sweep: SweepResult,
    topology: TopologyKind,
    requested: &[Characteristic],
    three_d: bool,
    omitted: &mut Vec<Omission>,
) -> CornerReport {
    let corner = sweep.corner;
    let mut series = Vec::new();
    for &characteristic in requested {
        if characteristic == Characteristic::Caster && corner.end == AxleEnd::Rear {
            tracing::debug!(%corner, "caster is only reported for the front half");
            omitted.push(Omission {
                corner,
                characteristic,
                reason: "caster is only reported for the front half".to_owned(),
            });
            continue;
        }
        match sweep.series(characteristic) {
            Ok(samples) => series.push(Series {
                characteristic,
                samples,
            }),
            Err(error) => {
                match &error {
                    CharacteristicError::NotApplicable { .. } => {
                        tracing::warn!(%corner, %characteristic, "characteristic omitted: {error}");
                    }
                    CharacteristicError::MalformedStep { .. } => {
                        tracing::error!(%corner, %characteristic, "malformed step: {error}");
                    }
                }
                omitted.push(Omission {
                    corner,
                    characteristic,
                    reason: error.to_string(),
                });
            }
        }
    }
    let frames = if !three_d {
        None
    } else if topology == TopologyKind::for_axle_end(corner.end) {
        Some(sweep.steps.iter().map(|step| step.points.clone()).collect())
    } else {
        tracing::debug!(%corner, %topology, "point frames skipped for mismatched topology");
        None
    };
    CornerReport {
        corner,
        gaps: sweep
            .gaps
            .iter()
            .map(|gap| GapReport {
                travel: gap.travel,
                reason: gap.error.to_string(),
            })
            .collect(),
        steps: sweep.steps,
        series,
        frames,
    }
}
