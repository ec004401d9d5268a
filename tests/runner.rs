#![warn(clippy::pedantic)]

mod common;

use approx::assert_abs_diff_eq;
use suspx::{
    config_from_str, run_simulation, vehicle_from_str, AxleEnd, Characteristic, CharacteristicFlags,
    ConfigurationError, CornerId, Side, SimulationConfig, SimulationKind, TravelSweep,
};

fn config(simulation: SimulationKind, side: Side, half: AxleEnd) -> SimulationConfig {
    SimulationConfig {
        simulation,
        side,
        half,
        plots: CharacteristicFlags {
            axle_plunge: true,
            axle_angles: true,
            kingpin_inclination: true,
            ..CharacteristicFlags::default()
        },
        ..SimulationConfig::default()
    }
}

#[test]
fn series_are_aligned_with_solved_steps() {
    let vehicle = common::vehicle();
    let config = config(SimulationKind::WheelAttitude, Side::Left, AxleEnd::Front);
    let report = run_simulation(&vehicle, &config).expect("valid configuration");

    assert_eq!(report.corners.len(), 1);
    let corner = report.corner(CornerId::FRONT_LEFT).expect("front-left simulated");
    assert_eq!(corner.steps.len(), 51);
    assert!(report.omitted.is_empty());
    assert_eq!(corner.series.len(), 7);
    for series in &corner.series {
        assert_eq!(series.samples.len(), corner.steps.len());
        for ((travel, value), step) in series.samples.iter().zip(&corner.steps) {
            assert_abs_diff_eq!(*travel, step.travel);
            assert!(value.is_finite());
        }
    }
    let plunge = corner
        .series(Characteristic::AxlePlunge)
        .expect("driven corner reports plunge");
    assert_abs_diff_eq!(plunge.samples[25].1, 0.0, epsilon = 1.0e-6);
}

#[test]
fn rear_half_omits_steering_characteristics() {
    let vehicle = common::vehicle();
    let config = config(SimulationKind::WheelAttitude, Side::Right, AxleEnd::Rear);
    let report = run_simulation(&vehicle, &config).expect("valid configuration");

    let corner = report.corner(CornerId::REAR_RIGHT).expect("rear-right simulated");
    assert!(corner.series(Characteristic::Caster).is_none());
    assert!(corner.series(Characteristic::KingpinInclination).is_none());
    assert!(corner.series(Characteristic::Camber).is_some());

    let omitted: Vec<Characteristic> = report
        .omitted
        .iter()
        .map(|omission| omission.characteristic)
        .collect();
    assert_eq!(
        omitted,
        vec![Characteristic::Caster, Characteristic::KingpinInclination]
    );
    assert!(report.omitted[0].reason.contains("front half"));
}

#[test]
fn undriven_corner_omits_axle_characteristics() {
    let vehicle = vehicle_from_str(common::REAR_DRIVE_JSON).expect("valid vehicle");
    let config = config(SimulationKind::WheelAttitude, Side::Right, AxleEnd::Front);
    let report = run_simulation(&vehicle, &config).expect("valid configuration");

    let omitted: Vec<Characteristic> = report
        .omitted
        .iter()
        .map(|omission| omission.characteristic)
        .collect();
    assert_eq!(
        omitted,
        vec![
            Characteristic::AxlePlunge,
            Characteristic::AxleAngleInboard,
            Characteristic::AxleAngleOutboard,
        ]
    );
    let corner = report.corner(CornerId::FRONT_RIGHT).expect("front-right simulated");
    assert!(corner.series(Characteristic::Caster).is_some());
}

#[test]
fn jacking_reports_both_corners_and_coupled_series() {
    let vehicle = common::vehicle();
    let config = config(SimulationKind::Jacking, Side::Right, AxleEnd::Front);
    let report = run_simulation(&vehicle, &config).expect("valid configuration");

    assert_eq!(report.corners.len(), 2);
    assert_eq!(report.corners[0].corner, CornerId::FRONT_LEFT);
    assert_eq!(report.corners[1].corner, CornerId::FRONT_RIGHT);
    assert_eq!(report.jacking.len(), 51);
    assert!(report.corners.iter().all(|corner| !corner.series.is_empty()));
}

#[test]
fn point_frames_are_kept_on_request() {
    let vehicle = common::vehicle();
    let mut config = config(SimulationKind::WheelAttitude, Side::Left, AxleEnd::Rear);
    config.plots.three_d = true;
    let report = run_simulation(&vehicle, &config).expect("valid configuration");

    let corner = report.corner(CornerId::REAR_LEFT).expect("rear-left simulated");
    let frames = corner.frames.as_ref().expect("frames requested");
    assert_eq!(frames.len(), corner.steps.len());

    config.plots.three_d = false;
    let report = run_simulation(&vehicle, &config).expect("valid configuration");
    assert!(report.corners[0].frames.is_none());
}

#[test]
fn out_of_range_travel_is_reported_as_gaps() {
    let vehicle = common::vehicle();
    let mut config = config(SimulationKind::WheelAttitude, Side::Left, AxleEnd::Front);
    config.travel = TravelSweep {
        start: 0.0,
        end: 2000.0,
        steps: 5,
    };
    let report = run_simulation(&vehicle, &config).expect("gaps never fail a run");
    let corner = &report.corners[0];
    assert!(!corner.gaps.is_empty());
    assert!(corner
        .series
        .iter()
        .all(|series| series.samples.len() == corner.steps.len()));
}

#[test]
fn invalid_sweep_fails_before_solving() {
    let vehicle = common::vehicle();
    let mut config = SimulationConfig::default();
    config.travel.steps = 0;
    assert!(matches!(
        run_simulation(&vehicle, &config),
        Err(ConfigurationError::InvalidSweep { .. })
    ));
}

#[test]
fn json_configuration_drives_a_run() {
    let vehicle = vehicle_from_str(common::REAR_DRIVE_JSON).expect("valid vehicle");
    let config = config_from_str(
        r#"{
            "simulation": "wheel_attitude",
            "half": "rear",
            "travel": { "start": -10.0, "end": 10.0, "steps": 21 },
            "plots": { "camber": true, "caster": true, "toe": true, "axle_plunge": true }
        }"#,
    )
    .expect("valid config");
    let report = run_simulation(&vehicle, &config).expect("valid configuration");
    let corner = report.corner(CornerId::REAR_RIGHT).expect("default side is right");
    assert_eq!(corner.steps.len(), 21);
    assert!(corner.series(Characteristic::AxlePlunge).is_some());

    let json = serde_json::to_value(&report).expect("report serialises");
    assert_eq!(json["simulation"], "wheel_attitude");
    assert_eq!(json["omitted"][0]["characteristic"], "caster");
}
