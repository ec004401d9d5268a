//! Engineering characteristics derived from solved steps.
//!
//! Every function here is pure: the same step always yields the same value.
//! Angles are returned in degrees and lengths in millimetres, using these
//! conventions:
//!
//! * camber is negative when the top of the wheel leans towards the vehicle,
//! * toe is positive for toe-in (front of the wheel pointing inboard),
//! * caster is positive when the top of the steering axis leans rearward,
//! * kingpin inclination is positive when the top of the steering axis leans
//!   inboard,
//! * axle plunge is positive when the half-shaft extends.

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::errors::CharacteristicError;
use crate::geometry::TOLERANCE;
use crate::hardpoints::{Hardpoint, TopologyKind};
use crate::step::Step;

/// Named quantity that can be derived from a [`Step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characteristic {
    /// Wheel inclination from vertical, front view (degrees).
    Camber,
    /// Steering axis inclination from vertical, side view (degrees).
    Caster,
    /// Wheel yaw relative to the centerline, top view (degrees).
    Toe,
    /// Steering axis inclination from vertical, front view (degrees).
    KingpinInclination,
    /// Half-shaft length change from static (millimetres).
    AxlePlunge,
    /// Half-shaft angle at the inboard joint (degrees).
    AxleAngleInboard,
    /// Half-shaft angle at the outboard joint (degrees).
    AxleAngleOutboard,
    /// Outboard wheel-center displacement from static (millimetres).
    TrackChange,
    /// Forward wheel-center displacement from static (millimetres).
    WheelbaseChange,
}

impl Characteristic {
    /// Every characteristic in reporting order.
    pub const ALL: [Self; 9] = [
        Self::Camber,
        Self::Caster,
        Self::Toe,
        Self::KingpinInclination,
        Self::AxlePlunge,
        Self::AxleAngleInboard,
        Self::AxleAngleOutboard,
        Self::TrackChange,
        Self::WheelbaseChange,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Camber => "camber",
            Self::Caster => "caster",
            Self::Toe => "toe",
            Self::KingpinInclination => "kingpin inclination",
            Self::AxlePlunge => "axle plunge",
            Self::AxleAngleInboard => "inboard axle angle",
            Self::AxleAngleOutboard => "outboard axle angle",
            Self::TrackChange => "track change",
            Self::WheelbaseChange => "wheelbase change",
        }
    }

    /// Unit of the returned value.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::AxlePlunge | Self::TrackChange | Self::WheelbaseChange => "mm",
            _ => "deg",
        }
    }

    /// Derive this characteristic from `step`.
    ///
    /// # Errors
    ///
    /// Returns [`CharacteristicError::NotApplicable`] when the corner has no
    /// such quantity and [`CharacteristicError::MalformedStep`] when the step
    /// lacks points its topology guarantees.
    ///
    /// # Examples
    /// ```
    /// use suspx::{point, Characteristic, CornerId, Hardpoint, HardpointSet, Step, TopologyKind};
    ///
    /// let step = Step {
    ///     travel: 0.0,
    ///     corner: CornerId::REAR_LEFT,
    ///     topology: TopologyKind::SemiTrailingLink,
    ///     swing_angle: 0.0,
    ///     points: HardpointSet::new()
    ///         .with(Hardpoint::Spindle, point(0.0, 500.0, 250.0))
    ///         .with(Hardpoint::WheelCenter, point(0.0, 550.0, 250.0)),
    ///     static_wheel_center: point(0.0, 550.0, 250.0),
    ///     axle_length: None,
    ///     tire_radius: 280.0,
    /// };
    /// assert_eq!(Characteristic::Camber.evaluate(&step), Ok(0.0));
    /// assert!(Characteristic::Caster.evaluate(&step).is_err());
    /// ```
    pub fn evaluate(self, step: &Step) -> Result<f64, CharacteristicError> {
        let value = match self {
            Self::Camber => camber(step),
            Self::Caster => caster(step),
            Self::Toe => toe(step),
            Self::KingpinInclination => kingpin_inclination(step),
            Self::AxlePlunge => axle_plunge(step),
            Self::AxleAngleInboard => axle_angle_inboard(step),
            Self::AxleAngleOutboard => axle_angle_outboard(step),
            Self::TrackChange => track_change(step),
            Self::WheelbaseChange => wheelbase_change(step),
        }?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(malformed(self, "derived value is not finite"))
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wheel camber in degrees, negative when the top of the wheel leans inboard.
///
/// # Errors
///
/// Returns [`CharacteristicError::MalformedStep`] when the spin axis is
/// missing or degenerate.
pub fn camber(step: &Step) -> Result<f64, CharacteristicError> {
    let axis = spin_axis(step, Characteristic::Camber)?;
    let lateral = axis.dot(&step.outboard());
    planar_angle(Characteristic::Camber, -axis.z, lateral)
}

/// Wheel toe in degrees, positive for toe-in.
///
/// # Errors
///
/// Returns [`CharacteristicError::MalformedStep`] when the spin axis is
/// missing or degenerate.
pub fn toe(step: &Step) -> Result<f64, CharacteristicError> {
    let axis = spin_axis(step, Characteristic::Toe)?;
    let lateral = axis.dot(&step.outboard());
    planar_angle(Characteristic::Toe, axis.x, lateral)
}

/// Caster angle in degrees, positive when the top of the steering axis leans
/// rearward.
///
/// # Errors
///
/// Returns [`CharacteristicError::NotApplicable`] for corners without a
/// steering axis.
pub fn caster(step: &Step) -> Result<f64, CharacteristicError> {
    let axis = steering_axis(step, Characteristic::Caster)?;
    planar_angle(Characteristic::Caster, -axis.x, axis.z)
}

/// Kingpin inclination in degrees, positive when the top of the steering axis
/// leans inboard.
///
/// # Errors
///
/// Returns [`CharacteristicError::NotApplicable`] for corners without a
/// steering axis.
pub fn kingpin_inclination(step: &Step) -> Result<f64, CharacteristicError> {
    let axis = steering_axis(step, Characteristic::KingpinInclination)?;
    let lateral = axis.dot(&step.outboard());
    planar_angle(Characteristic::KingpinInclination, -lateral, axis.z)
}

/// Half-shaft length change from static in millimetres.
///
/// # Errors
///
/// Returns [`CharacteristicError::NotApplicable`] for undriven corners.
pub fn axle_plunge(step: &Step) -> Result<f64, CharacteristicError> {
    let shaft = half_shaft(step, Characteristic::AxlePlunge)?;
    Ok(shaft.length - shaft.static_length)
}

/// Angle in degrees between the half-shaft and the lateral differential
/// output axis at the inboard joint.
///
/// # Errors
///
/// Returns [`CharacteristicError::NotApplicable`] for undriven corners.
pub fn axle_angle_inboard(step: &Step) -> Result<f64, CharacteristicError> {
    let shaft = half_shaft(step, Characteristic::AxleAngleInboard)?;
    Ok(shaft.direction.angle(&step.outboard()).to_degrees())
}

/// Angle in degrees between the half-shaft and the wheel spin axis at the
/// outboard joint.
///
/// # Errors
///
/// Returns [`CharacteristicError::NotApplicable`] for undriven corners.
pub fn axle_angle_outboard(step: &Step) -> Result<f64, CharacteristicError> {
    let shaft = half_shaft(step, Characteristic::AxleAngleOutboard)?;
    let axis = spin_axis(step, Characteristic::AxleAngleOutboard)?;
    Ok(shaft.direction.angle(&axis).to_degrees())
}

/// Outboard displacement of the wheel center from static in millimetres.
///
/// # Errors
///
/// Returns [`CharacteristicError::MalformedStep`] when the wheel center is
/// missing.
pub fn track_change(step: &Step) -> Result<f64, CharacteristicError> {
    let offset = wheel_center_offset(step, Characteristic::TrackChange)?;
    Ok(offset.dot(&step.outboard()))
}

/// Forward displacement of the wheel center from static in millimetres.
///
/// # Errors
///
/// Returns [`CharacteristicError::MalformedStep`] when the wheel center is
/// missing.
pub fn wheelbase_change(step: &Step) -> Result<f64, CharacteristicError> {
    Ok(wheel_center_offset(step, Characteristic::WheelbaseChange)?.x)
}

/// Unit spin axis pointing outboard, from the spindle to the wheel center.
pub(crate) fn spin_axis(
    step: &Step,
    characteristic: Characteristic,
) -> Result<Vector3<f64>, CharacteristicError> {
    let wheel_center = required(step, characteristic, Hardpoint::WheelCenter)?;
    let spindle = required(step, characteristic, Hardpoint::Spindle)?;
    nalgebra::Unit::try_new(wheel_center - spindle, TOLERANCE)
        .map(nalgebra::Unit::into_inner)
        .ok_or_else(|| malformed(characteristic, "spindle coincides with wheel center"))
}

/// Unit steering axis from the lower to the upper ball joint.
fn steering_axis(
    step: &Step,
    characteristic: Characteristic,
) -> Result<Vector3<f64>, CharacteristicError> {
    if step.topology != TopologyKind::DoubleAArm {
        return Err(not_applicable(step, characteristic));
    }
    let upper = required(step, characteristic, Hardpoint::UpperBallJoint)?;
    let lower = required(step, characteristic, Hardpoint::LowerBallJoint)?;
    nalgebra::Unit::try_new(upper - lower, TOLERANCE)
        .map(nalgebra::Unit::into_inner)
        .ok_or_else(|| malformed(characteristic, "ball joints coincide"))
}

/// Solved half-shaft state.
struct HalfShaft {
    /// Unit direction from the inboard to the outboard joint.
    direction: Vector3<f64>,
    /// Current joint-to-joint length.
    length: f64,
    /// Joint-to-joint length at static ride height.
    static_length: f64,
}

/// Half-shaft direction and lengths of a driven step.
fn half_shaft(
    step: &Step,
    characteristic: Characteristic,
) -> Result<HalfShaft, CharacteristicError> {
    let static_length = step
        .axle_length
        .ok_or_else(|| not_applicable(step, characteristic))?;
    let inboard = required(step, characteristic, Hardpoint::AxleInboard)?;
    let outboard = required(step, characteristic, Hardpoint::AxleOutboard)?;
    let shaft = outboard - inboard;
    let length = shaft.norm();
    if length <= TOLERANCE {
        return Err(malformed(characteristic, "axle joints coincide"));
    }
    Ok(HalfShaft {
        direction: shaft / length,
        length,
        static_length,
    })
}

/// Wheel-center displacement from static ride height.
fn wheel_center_offset(
    step: &Step,
    characteristic: Characteristic,
) -> Result<Vector3<f64>, CharacteristicError> {
    let wheel_center = required(step, characteristic, Hardpoint::WheelCenter)?;
    Ok(wheel_center - step.static_wheel_center.to_vector())
}

/// Angle in degrees of the planar vector whose components are `opposite`
/// (numerator) and `adjacent` (denominator).
fn planar_angle(
    characteristic: Characteristic,
    opposite: f64,
    adjacent: f64,
) -> Result<f64, CharacteristicError> {
    if opposite.hypot(adjacent) <= TOLERANCE {
        return Err(malformed(
            characteristic,
            "axis is perpendicular to the projection plane",
        ));
    }
    Ok(opposite.atan2(adjacent).to_degrees())
}

/// Solved position of a hardpoint the characteristic needs.
fn required(
    step: &Step,
    characteristic: Characteristic,
    hardpoint: Hardpoint,
) -> Result<Vector3<f64>, CharacteristicError> {
    step.vector(hardpoint)
        .ok_or_else(|| malformed(characteristic, format!("missing hardpoint `{hardpoint}`")))
}

/// Error for a characteristic the corner does not have.
fn not_applicable(step: &Step, characteristic: Characteristic) -> CharacteristicError {
    CharacteristicError::NotApplicable {
        characteristic,
        corner: step.corner,
        topology: step.topology,
    }
}

/// Error for a step missing what the characteristic needs.
fn malformed(characteristic: Characteristic, reason: impl Into<String>) -> CharacteristicError {
    CharacteristicError::MalformedStep {
        characteristic,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;
    use crate::hardpoints::HardpointSet;
    use crate::vehicle::CornerId;

    /// Front-left step with 2° negative camber, 1° toe-in, 5° caster and 8° KPI.
    fn front_left_step() -> Step {
        let camber = 2.0_f64.to_radians();
        let toe = 1.0_f64.to_radians();
        let spin = Vector3::new(toe.sin(), toe.cos() * camber.cos(), camber.sin()).normalize();
        let wheel_center = Vector3::new(0.0, 560.0, 170.0);
        let spindle = wheel_center - spin * 50.0;
        let caster = 5.0_f64.to_radians();
        let kpi = 8.0_f64.to_radians();
        let lower = Vector3::new(0.0, 480.0, 50.0);
        let upper = lower + Vector3::new(-caster.tan(), -kpi.tan(), 1.0) * 250.0;
        Step {
            travel: 0.0,
            corner: CornerId::FRONT_LEFT,
            topology: TopologyKind::DoubleAArm,
            swing_angle: 0.0,
            points: HardpointSet::new()
                .with(Hardpoint::WheelCenter, wheel_center.into())
                .with(Hardpoint::Spindle, spindle.into())
                .with(Hardpoint::LowerBallJoint, lower.into())
                .with(Hardpoint::UpperBallJoint, upper.into())
                .with(Hardpoint::AxleInboard, point(0.0, 150.0, 170.0))
                .with(Hardpoint::AxleOutboard, point(0.0, 500.0, 170.0)),
            static_wheel_center: point(0.0, 558.0, 160.0),
            axle_length: Some(345.0),
            tire_radius: 280.0,
        }
    }

    fn mirror(step: &Step) -> Step {
        Step {
            corner: CornerId::FRONT_RIGHT,
            points: step.points.mirrored(),
            static_wheel_center: step.static_wheel_center.mirrored(),
            ..step.clone()
        }
    }

    #[test]
    fn wheel_attitude_signs_follow_conventions() {
        let step = front_left_step();
        assert_relative_eq!(camber(&step).expect("camber"), -2.0, epsilon = 2.0e-3);
        assert_relative_eq!(toe(&step).expect("toe"), 1.0, epsilon = 2.0e-3);
        assert_relative_eq!(caster(&step).expect("caster"), 5.0, epsilon = 1.0e-9);
        assert_relative_eq!(kingpin_inclination(&step).expect("kpi"), 8.0, epsilon = 1.0e-9);
    }

    #[test]
    fn mirrored_corner_reports_identical_attitude() {
        let left = front_left_step();
        let right = mirror(&left);
        for characteristic in Characteristic::ALL {
            assert_relative_eq!(
                characteristic.evaluate(&left).expect("left"),
                characteristic.evaluate(&right).expect("right"),
                epsilon = 1.0e-9
            );
        }
    }

    #[test]
    fn axle_and_wheel_center_quantities() {
        let step = front_left_step();
        assert_relative_eq!(axle_plunge(&step).expect("plunge"), 5.0, epsilon = 1.0e-9);
        assert_relative_eq!(axle_angle_inboard(&step).expect("inboard"), 0.0, epsilon = 1.0e-6);
        let spin = spin_axis(&step, Characteristic::AxleAngleOutboard).expect("axis");
        assert_relative_eq!(
            axle_angle_outboard(&step).expect("outboard"),
            spin.angle(&Vector3::y()).to_degrees(),
            epsilon = 1.0e-9
        );
        assert_relative_eq!(track_change(&step).expect("track"), 2.0, epsilon = 1.0e-9);
        assert_relative_eq!(wheelbase_change(&step).expect("wheelbase"), 0.0, epsilon = 1.0e-9);
    }

    #[test]
    fn steering_quantities_do_not_apply_to_trailing_links() {
        let step = Step {
            topology: TopologyKind::SemiTrailingLink,
            corner: CornerId::REAR_LEFT,
            ..front_left_step()
        };
        for characteristic in [Characteristic::Caster, Characteristic::KingpinInclination] {
            assert_eq!(
                characteristic.evaluate(&step),
                Err(CharacteristicError::NotApplicable {
                    characteristic,
                    corner: CornerId::REAR_LEFT,
                    topology: TopologyKind::SemiTrailingLink,
                })
            );
        }
        assert!(camber(&step).is_ok());
    }

    #[test]
    fn undriven_corner_has_no_axle_characteristics() {
        let step = Step {
            axle_length: None,
            ..front_left_step()
        };
        assert!(matches!(
            axle_plunge(&step),
            Err(CharacteristicError::NotApplicable { .. })
        ));
    }

    #[test]
    fn missing_points_are_reported_as_malformed() {
        let mut step = front_left_step();
        step.points.remove(Hardpoint::Spindle);
        assert!(matches!(
            camber(&step),
            Err(CharacteristicError::MalformedStep { .. })
        ));
        step.points.remove(Hardpoint::AxleOutboard);
        assert!(matches!(
            axle_plunge(&step),
            Err(CharacteristicError::MalformedStep { .. })
        ));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let step = front_left_step();
        for characteristic in Characteristic::ALL {
            let first = characteristic.evaluate(&step).expect("applicable");
            let second = characteristic.evaluate(&step).expect("applicable");
            assert!(first.is_finite());
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
