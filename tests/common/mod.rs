#![allow(dead_code)]

use suspx::{point, CornerSpec, Hardpoint, HardpointSet, Vehicle, VehicleSpec};

/// Front-left double A-arm with 1° static negative camber and a drive axle.
pub fn front_left() -> CornerSpec {
    CornerSpec {
        hardpoints: HardpointSet::new()
            .with(Hardpoint::UpperFrontPivot, point(120.0, 250.0, 310.0))
            .with(Hardpoint::UpperRearPivot, point(-120.0, 250.0, 310.0))
            .with(Hardpoint::UpperBallJoint, point(0.0, 500.0, 300.0))
            .with(Hardpoint::LowerFrontPivot, point(150.0, 200.0, 80.0))
            .with(Hardpoint::LowerRearPivot, point(-150.0, 200.0, 80.0))
            .with(Hardpoint::LowerBallJoint, point(0.0, 480.0, 50.0))
            .with(Hardpoint::TieRodInner, point(80.0, 230.0, 180.0))
            .with(Hardpoint::TieRodOuter, point(80.0, 490.0, 170.0))
            .with(Hardpoint::WheelCenter, point(0.0, 560.0, 170.0))
            .with(Hardpoint::Spindle, point(0.0, 510.007_615, 169.127_379_7))
            .with(Hardpoint::AxleInboard, point(0.0, 150.0, 170.0))
            .with(Hardpoint::AxleOutboard, point(0.0, 500.0, 169.0)),
        tire_radius: 280.0,
    }
}

/// Rear-left semi-trailing link with a drive axle.
pub fn rear_left() -> CornerSpec {
    CornerSpec {
        hardpoints: HardpointSet::new()
            .with(Hardpoint::PivotInboard, point(-300.0, 150.0, 200.0))
            .with(Hardpoint::PivotOutboard, point(-250.0, 450.0, 210.0))
            .with(Hardpoint::WheelCenter, point(0.0, 600.0, 250.0))
            .with(Hardpoint::Spindle, point(0.0, 550.0, 250.0))
            .with(Hardpoint::AxleInboard, point(0.0, 120.0, 250.0))
            .with(Hardpoint::AxleOutboard, point(0.0, 540.0, 250.0)),
        tire_radius: 280.0,
    }
}

/// Vehicle described by its left corners only; the right side is mirrored.
pub fn vehicle() -> Vehicle {
    let spec = VehicleSpec {
        front_left: Some(front_left()),
        rear_left: Some(rear_left()),
        ..VehicleSpec::default()
    };
    Vehicle::from_spec(&spec).expect("fixture vehicle is valid")
}

/// Rear-wheel-drive vehicle as a JSON document: undriven front corners.
pub const REAR_DRIVE_JSON: &str = r#"{
    "front_right": {
        "tire_radius": 280.0,
        "hardpoints": {
            "upper_front_pivot": [120.0, -250.0, 310.0],
            "upper_rear_pivot": [-120.0, -250.0, 310.0],
            "upper_ball_joint": [0.0, -500.0, 300.0],
            "lower_front_pivot": [150.0, -200.0, 80.0],
            "lower_rear_pivot": [-150.0, -200.0, 80.0],
            "lower_ball_joint": [0.0, -480.0, 50.0],
            "tie_rod_inner": [80.0, -230.0, 180.0],
            "tie_rod_outer": [80.0, -490.0, 170.0],
            "wheel_center": [0.0, -560.0, 170.0],
            "spindle": [0.0, -510.007615, 169.1273797]
        }
    },
    "rear_right": {
        "tire_radius": 280.0,
        "hardpoints": {
            "pivot_inboard": [-300.0, -150.0, 200.0],
            "pivot_outboard": [-250.0, -450.0, 210.0],
            "wheel_center": [0.0, -600.0, 250.0],
            "spindle": [0.0, -550.0, 250.0],
            "axle_inboard": [0.0, -120.0, 250.0],
            "axle_outboard": [0.0, -540.0, 250.0]
        }
    }
}"#;
