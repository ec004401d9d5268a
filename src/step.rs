//! Solved state of a corner at one travel value.

use nalgebra::Vector3;
use serde::Serialize;

use crate::geometry::Point;
use crate::hardpoints::{Hardpoint, HardpointSet, TopologyKind};
use crate::solver::SolveHint;
use crate::vehicle::CornerId;

/// The solved geometry of one corner at one travel value.
///
/// Steps are produced by the solver and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    /// Requested wheel-center travel in millimetres (positive = bump).
    pub travel: f64,
    /// Corner the step belongs to.
    pub corner: CornerId,
    /// Topology that produced the step.
    pub topology: TopologyKind,
    /// Generalised coordinate of the solve in radians: the lower-arm swing for
    /// a double A-arm, the link rotation for a semi-trailing link.
    pub swing_angle: f64,
    /// Every hardpoint at its solved position.
    pub points: HardpointSet,
    /// Wheel center at static ride height.
    pub static_wheel_center: Point,
    /// Static half-shaft length, present for driven corners only.
    pub axle_length: Option<f64>,
    /// Loaded tire radius in millimetres.
    pub tire_radius: f64,
}

impl Step {
    /// Solved position of `hardpoint`.
    #[must_use]
    pub fn point(&self, hardpoint: Hardpoint) -> Option<Point> {
        self.points.get(hardpoint)
    }

    /// Solved position of `hardpoint` as a vector.
    pub(crate) fn vector(&self, hardpoint: Hardpoint) -> Option<Vector3<f64>> {
        self.point(hardpoint).map(Point::to_vector)
    }

    /// Hint that keeps the next solve on the same assembly branch as this one.
    #[must_use]
    pub fn hint(&self) -> SolveHint {
        SolveHint {
            swing_angle: self.swing_angle,
            reference: self.points.clone(),
        }
    }

    /// Unit vector pointing away from the vehicle centre plane on this side.
    #[must_use]
    pub fn outboard(&self) -> Vector3<f64> {
        Vector3::y() * self.corner.side.outboard_sign()
    }
}
