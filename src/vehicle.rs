//! Vehicle, corner identification and the corner-level solve entry point.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurationError, GeometryError};
use crate::geometry::Point;
use crate::hardpoints::{Hardpoint, HardpointSet, Topology};
use crate::solver::SolveHint;
use crate::step::Step;

/// Side of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left-hand side (positive y).
    Left,
    /// Right-hand side (negative y).
    #[default]
    Right,
}

impl Side {
    /// Sign of the lateral coordinate pointing away from the centre plane.
    #[must_use]
    pub const fn outboard_sign(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Axle end (half) of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxleEnd {
    /// Front half, steered double A-arm corners.
    #[default]
    Front,
    /// Rear half, semi-trailing link corners.
    Rear,
}

impl AxleEnd {
    /// Lower-case name of the half.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
        }
    }
}

/// Identifies one of the four corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CornerId {
    /// Axle end of the corner.
    pub end: AxleEnd,
    /// Side of the corner.
    pub side: Side,
}

impl CornerId {
    /// Front-left corner.
    pub const FRONT_LEFT: Self = Self::new(AxleEnd::Front, Side::Left);
    /// Front-right corner.
    pub const FRONT_RIGHT: Self = Self::new(AxleEnd::Front, Side::Right);
    /// Rear-left corner.
    pub const REAR_LEFT: Self = Self::new(AxleEnd::Rear, Side::Left);
    /// Rear-right corner.
    pub const REAR_RIGHT: Self = Self::new(AxleEnd::Rear, Side::Right);

    /// Create a corner identifier.
    #[must_use]
    pub const fn new(end: AxleEnd, side: Side) -> Self {
        Self { end, side }
    }
}

impl fmt::Display for CornerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Left => "left",
            Side::Right => "right",
        };
        write!(f, "{}-{side}", self.end.name())
    }
}

/// Hardpoint description of one corner as supplied by configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerSpec {
    /// Static hardpoint coordinates in millimetres.
    pub hardpoints: HardpointSet,
    /// Loaded tire radius in millimetres.
    pub tire_radius: f64,
}

impl CornerSpec {
    /// The same corner reflected to the other side of the vehicle.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            hardpoints: self.hardpoints.mirrored(),
            tire_radius: self.tire_radius,
        }
    }
}

/// Hardpoint description of a whole vehicle.
///
/// A missing corner is mirrored from the opposite side of the same axle end.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// Front-left corner.
    #[serde(default)]
    pub front_left: Option<CornerSpec>,
    /// Front-right corner.
    #[serde(default)]
    pub front_right: Option<CornerSpec>,
    /// Rear-left corner.
    #[serde(default)]
    pub rear_left: Option<CornerSpec>,
    /// Rear-right corner.
    #[serde(default)]
    pub rear_right: Option<CornerSpec>,
}

/// Resolve both corners of one axle end, mirroring when only one is given.
fn resolve_pair(
    end: AxleEnd,
    left: Option<&CornerSpec>,
    right: Option<&CornerSpec>,
) -> Result<(CornerSpec, CornerSpec), ConfigurationError> {
    match (left, right) {
        (Some(left), Some(right)) => Ok((left.clone(), right.clone())),
        (Some(left), None) => Ok((left.clone(), left.mirrored())),
        (None, Some(right)) => Ok((right.mirrored(), right.clone())),
        (None, None) => Err(ConfigurationError::MissingAxleEnd(end.name())),
    }
}

/// One suspension corner with its geometry.
#[derive(Clone, Debug)]
pub struct Corner {
    /// Which corner this is.
    id: CornerId,
    /// Suspension geometry.
    topology: Topology,
    /// Loaded tire radius in millimetres.
    tire_radius: f64,
    /// Wheel center at static ride height.
    static_wheel_center: Point,
}

impl Corner {
    /// Build a corner, choosing the topology mandated by its axle end.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the hardpoints do not form a valid
    /// topology or the tire radius is not positive.
    pub fn new(id: CornerId, spec: &CornerSpec) -> Result<Self, ConfigurationError> {
        if !(spec.tire_radius.is_finite() && spec.tire_radius > 0.0) {
            return Err(ConfigurationError::NonPositiveTireRadius(spec.tire_radius));
        }
        let topology = Topology::for_axle_end(id.end, &spec.hardpoints)?;
        let static_wheel_center = topology
            .hardpoints()
            .require(topology.kind(), Hardpoint::WheelCenter)?
            .into();
        Ok(Self {
            id,
            topology,
            tire_radius: spec.tire_radius,
            static_wheel_center,
        })
    }

    /// Which corner this is.
    #[must_use]
    pub fn id(&self) -> CornerId {
        self.id
    }

    /// Suspension geometry of the corner.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Loaded tire radius in millimetres.
    #[must_use]
    pub fn tire_radius(&self) -> f64 {
        self.tire_radius
    }

    /// Solve the corner at `travel` millimetres of wheel-center travel.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`] when the mechanism cannot reach
    /// the requested travel.
    pub fn solve(&self, travel: f64, hint: Option<&SolveHint>) -> Result<Step, GeometryError> {
        let pose = self.topology.solve(travel, hint)?;
        let residual = self.topology.linkage().max_length_error(&pose.points);
        tracing::trace!(
            corner = %self.id,
            travel,
            swing_angle = pose.swing_angle,
            residual = ?residual,
            "solved step"
        );
        Ok(Step {
            travel,
            corner: self.id,
            topology: self.topology.kind(),
            swing_angle: pose.swing_angle,
            points: pose.points,
            static_wheel_center: self.static_wheel_center,
            axle_length: self.topology.axle_length(),
            tire_radius: self.tire_radius,
        })
    }
}

/// A vehicle with four resolved corners.
///
/// Front corners are double A-arm and rear corners semi-trailing link.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// Front-left corner.
    front_left: Corner,
    /// Front-right corner.
    front_right: Corner,
    /// Rear-left corner.
    rear_left: Corner,
    /// Rear-right corner.
    rear_right: Corner,
}

impl Vehicle {
    /// Build every corner from a vehicle description.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when an axle end has no corner at all or
    /// any corner is invalid.
    pub fn from_spec(spec: &VehicleSpec) -> Result<Self, ConfigurationError> {
        let (front_left, front_right) = resolve_pair(
            AxleEnd::Front,
            spec.front_left.as_ref(),
            spec.front_right.as_ref(),
        )?;
        let (rear_left, rear_right) = resolve_pair(
            AxleEnd::Rear,
            spec.rear_left.as_ref(),
            spec.rear_right.as_ref(),
        )?;
        let vehicle = Self {
            front_left: Corner::new(CornerId::FRONT_LEFT, &front_left)?,
            front_right: Corner::new(CornerId::FRONT_RIGHT, &front_right)?,
            rear_left: Corner::new(CornerId::REAR_LEFT, &rear_left)?,
            rear_right: Corner::new(CornerId::REAR_RIGHT, &rear_right)?,
        };
        tracing::debug!("vehicle built with four corners");
        Ok(vehicle)
    }

    /// Look up a corner.
    #[must_use]
    pub fn corner(&self, id: CornerId) -> &Corner {
        match (id.end, id.side) {
            (AxleEnd::Front, Side::Left) => &self.front_left,
            (AxleEnd::Front, Side::Right) => &self.front_right,
            (AxleEnd::Rear, Side::Left) => &self.rear_left,
            (AxleEnd::Rear, Side::Right) => &self.rear_right,
        }
    }

    /// Left and right corners of one axle end.
    #[must_use]
    pub fn half(&self, end: AxleEnd) -> (&Corner, &Corner) {
        (
            self.corner(CornerId::new(end, Side::Left)),
            self.corner(CornerId::new(end, Side::Right)),
        )
    }

    /// All four corners, front first, left before right.
    #[must_use]
    pub fn corners(&self) -> [&Corner; 4] {
        [
            &self.front_left,
            &self.front_right,
            &self.rear_left,
            &self.rear_right,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    #[test]
    fn corner_names_are_readable() {
        assert_eq!(CornerId::FRONT_LEFT.to_string(), "front-left");
        assert_eq!(CornerId::REAR_RIGHT.to_string(), "rear-right");
    }

    #[test]
    fn defaults_follow_front_right() {
        assert_eq!(Side::default(), Side::Right);
        assert_eq!(AxleEnd::default(), AxleEnd::Front);
        assert_eq!(Side::Right.outboard_sign(), -1.0);
    }

    #[test]
    fn missing_axle_end_is_a_configuration_error() {
        let error = Vehicle::from_spec(&VehicleSpec::default()).expect_err("no corners");
        assert_eq!(error, ConfigurationError::MissingAxleEnd("front"));
    }

    #[test]
    fn non_positive_tire_radius_is_rejected() {
        let spec = CornerSpec {
            hardpoints: HardpointSet::new(),
            tire_radius: 0.0,
        };
        let error = Corner::new(CornerId::REAR_LEFT, &spec).expect_err("zero radius");
        assert_eq!(error, ConfigurationError::NonPositiveTireRadius(0.0));
    }

    #[test]
    fn steps_carry_the_static_wheel_center() {
        let hardpoints = HardpointSet::new()
            .with(Hardpoint::PivotInboard, point(-300.0, 150.0, 200.0))
            .with(Hardpoint::PivotOutboard, point(-250.0, 450.0, 210.0))
            .with(Hardpoint::WheelCenter, point(0.0, 600.0, 250.0))
            .with(Hardpoint::Spindle, point(0.0, 550.0, 250.0));
        let spec = CornerSpec {
            hardpoints,
            tire_radius: 250.0,
        };
        let corner = Corner::new(CornerId::REAR_LEFT, &spec).expect("valid corner");
        for travel in [-20.0, 0.0, 35.0] {
            let step = corner.solve(travel, None).expect("within range");
            assert_eq!(step.static_wheel_center, point(0.0, 600.0, 250.0));
        }
    }
}
