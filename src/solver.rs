//! Position solver mapping wheel-center travel to a consistent pose.
//!
//! Both topologies have one kinematic degree of freedom. The semi-trailing
//! link is solved in closed form about its fixed axis. The double A-arm is
//! parametrised by the lower-arm swing angle: for a given angle the upper
//! ball joint and the outer tie-rod end follow from circle/sphere
//! intersections, and a Newton iteration finds the angle that puts the wheel
//! center at the requested height.

use nalgebra::Vector3;

use crate::errors::GeometryError;
use crate::geometry::{closest_to, Axis, Circle, Frame, TOLERANCE};
use crate::hardpoints::{DoubleAArm, Hardpoint, HardpointSet, SemiTrailingLink, Topology};

/// Convergence threshold on the wheel-center height in millimetres.
const HEIGHT_TOLERANCE: f64 = 1.0e-9;
/// Iteration cap for the double A-arm height search.
const MAX_ITERATIONS: usize = 64;
/// Largest swing increment taken in one Newton update (radians).
const MAX_SWING_STEP: f64 = 0.05;
/// Lower-arm swing beyond which a double A-arm is considered out of range.
const MAX_SWING: f64 = std::f64::consts::FRAC_PI_2;
/// Perturbation used for the numerical height derivative (radians).
const SWING_PERTURBATION: f64 = 1.0e-6;

/// Solver state carried from one solve to the next.
///
/// The swing angle warm-starts the double A-arm search and the reference
/// points decide which of the two circle/sphere intersections is kept.
/// Without a hint the solver starts at static ride height and prefers the
/// static assembly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveHint {
    /// Generalised coordinate of the previous solve (radians).
    pub swing_angle: f64,
    /// Solved points of the previous solve.
    pub reference: HardpointSet,
}

/// Solved generalised coordinate and point positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    /// Generalised coordinate in radians.
    pub swing_angle: f64,
    /// Every hardpoint at its solved position.
    pub points: HardpointSet,
}

impl Topology {
    /// Solve the corner geometry at `travel` millimetres of wheel-center
    /// travel from static ride height.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`] when no valid pose exists.
    pub fn solve(&self, travel: f64, hint: Option<&SolveHint>) -> Result<Pose, GeometryError> {
        match self {
            Self::DoubleAArm(geometry) => geometry.solve(travel, hint),
            Self::SemiTrailingLink(geometry) => geometry.solve(travel),
        }
    }
}

impl DoubleAArm {
    /// Solve the corner at `travel` millimetres of wheel-center travel.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`] when an arm cannot reach its
    /// ball joint, the tie rod cannot reach the steering arm, or the wheel
    /// center cannot be raised or lowered that far.
    ///
    /// # Examples
    /// ```
    /// use suspx::{point, DoubleAArm, Hardpoint, HardpointSet};
    ///
    /// let points = HardpointSet::new()
    ///     .with(Hardpoint::UpperFrontPivot, point(120.0, 250.0, 310.0))
    ///     .with(Hardpoint::UpperRearPivot, point(-120.0, 250.0, 310.0))
    ///     .with(Hardpoint::UpperBallJoint, point(0.0, 500.0, 300.0))
    ///     .with(Hardpoint::LowerFrontPivot, point(150.0, 200.0, 80.0))
    ///     .with(Hardpoint::LowerRearPivot, point(-150.0, 200.0, 80.0))
    ///     .with(Hardpoint::LowerBallJoint, point(0.0, 480.0, 50.0))
    ///     .with(Hardpoint::TieRodInner, point(80.0, 230.0, 180.0))
    ///     .with(Hardpoint::TieRodOuter, point(80.0, 490.0, 170.0))
    ///     .with(Hardpoint::WheelCenter, point(0.0, 560.0, 170.0))
    ///     .with(Hardpoint::Spindle, point(0.0, 510.0, 170.0));
    /// let corner = DoubleAArm::new(&points).expect("valid geometry");
    ///
    /// let pose = corner.solve(10.0, None).expect("within range");
    /// let wheel_center = pose.points.get(Hardpoint::WheelCenter).expect("solved");
    /// assert!((wheel_center.z - 180.0).abs() < 1.0e-6);
    /// ```
    pub fn solve(&self, travel: f64, hint: Option<&SolveHint>) -> Result<Pose, GeometryError> {
        let statics = self.hardpoints();
        let wheel_center = self.static_vector(Hardpoint::WheelCenter);
        let target = wheel_center.z + travel;
        let mut references = BranchReferences {
            upper_ball_joint: reference(hint, statics, Hardpoint::UpperBallJoint),
            tie_rod_outer: reference(hint, statics, Hardpoint::TieRodOuter),
        };

        let mut swing = hint.map_or(0.0, |hint| hint.swing_angle);
        for _ in 0..MAX_ITERATIONS {
            let placed = self
                .place(swing, &references)
                .map_err(|reason| GeometryError::out_of_range(travel, reason))?;
            // Follow the branch through every iterate so long searches do not
            // jump to the mirrored assembly.
            references = BranchReferences {
                upper_ball_joint: placed.upper_ball_joint,
                tie_rod_outer: placed.tie_rod_outer,
            };
            let residual = placed.wheel_center.z - target;
            if residual.abs() <= HEIGHT_TOLERANCE {
                return Ok(Pose {
                    swing_angle: swing,
                    points: placed.into_set(statics),
                });
            }

            let height = |swing: f64| -> Result<f64, GeometryError> {
                self.place(swing, &references)
                    .map(|points| points.wheel_center.z)
                    .map_err(|reason| GeometryError::out_of_range(travel, reason))
            };
            let slope = (height(swing + SWING_PERTURBATION)? - height(swing - SWING_PERTURBATION)?)
                / (2.0 * SWING_PERTURBATION);
            if slope.abs() <= TOLERANCE {
                return Err(GeometryError::out_of_range(
                    travel,
                    "wheel center is at the end of its vertical reach",
                ));
            }
            swing += (-residual / slope).clamp(-MAX_SWING_STEP, MAX_SWING_STEP);
            if swing.abs() > MAX_SWING {
                return Err(GeometryError::out_of_range(
                    travel,
                    "lower arm swing limit exceeded",
                ));
            }
        }
        Err(GeometryError::out_of_range(
            travel,
            "wheel center height search did not converge",
        ))
    }

    /// Static coordinate of a hardpoint validated at construction.
    fn static_vector(&self, hardpoint: Hardpoint) -> Vector3<f64> {
        self.hardpoints()
            .get(hardpoint)
            .map(|point| point.to_vector())
            .unwrap_or_default()
    }

    /// Place the knuckle for a given lower-arm swing angle.
    fn place(
        &self,
        swing: f64,
        references: &BranchReferences,
    ) -> Result<PlacedKnuckle, &'static str> {
        let lower_ball_joint = self
            .lower_pivot_axis()
            .rotate(&self.static_vector(Hardpoint::LowerBallJoint), swing);

        let upper_candidates = self
            .upper_circle()
            .intersect_sphere(&lower_ball_joint, self.kingpin_length())
            .ok_or("upper arm cannot reach the upper ball joint")?;
        let upper_ball_joint = closest_to(upper_candidates, &references.upper_ball_joint);

        let kingpin = Axis::through(lower_ball_joint, upper_ball_joint)
            .ok_or("ball joints coincide")?;
        let (offset, radius) = self.steering_arm();
        let steering_circle = Circle::new(
            lower_ball_joint + kingpin.direction.into_inner() * offset,
            kingpin.direction,
            radius,
            &references.tie_rod_outer,
        )
        .ok_or("steering arm reference lies on the kingpin axis")?;
        let tie_rod_candidates = steering_circle
            .intersect_sphere(&self.static_vector(Hardpoint::TieRodInner), self.tie_rod_length())
            .ok_or("tie rod cannot reach the steering arm")?;
        let tie_rod_outer = closest_to(tie_rod_candidates, &references.tie_rod_outer);

        let frame = Frame::from_points(&upper_ball_joint, &lower_ball_joint, &tie_rod_outer)
            .ok_or("knuckle points became collinear")?;
        let carry = |hardpoint: Hardpoint| {
            self.knuckle()
                .carry(&frame, &self.static_vector(hardpoint))
        };
        Ok(PlacedKnuckle {
            upper_ball_joint,
            lower_ball_joint,
            tie_rod_outer,
            wheel_center: carry(Hardpoint::WheelCenter),
            spindle: carry(Hardpoint::Spindle),
            axle_outboard: self
                .axle_length()
                .map(|_| carry(Hardpoint::AxleOutboard)),
        })
    }
}

/// Points that decide which intersection branch is kept.
struct BranchReferences {
    /// Preferred upper ball joint position.
    upper_ball_joint: Vector3<f64>,
    /// Preferred outer tie-rod end position.
    tie_rod_outer: Vector3<f64>,
}

/// Fetch a branch reference from the hint, falling back to the static point.
fn reference(
    hint: Option<&SolveHint>,
    statics: &HardpointSet,
    hardpoint: Hardpoint,
) -> Vector3<f64> {
    hint.and_then(|hint| hint.reference.get(hardpoint))
        .or_else(|| statics.get(hardpoint))
        .map(|point| point.to_vector())
        .unwrap_or_default()
}

/// Knuckle points solved for one swing angle.
struct PlacedKnuckle {
    /// Upper ball joint on the upper-arm circle.
    upper_ball_joint: Vector3<f64>,
    /// Lower ball joint after the swing.
    lower_ball_joint: Vector3<f64>,
    /// Outer tie-rod end on the steering circle.
    tie_rod_outer: Vector3<f64>,
    /// Wheel center carried with the knuckle.
    wheel_center: Vector3<f64>,
    /// Spindle point carried with the knuckle.
    spindle: Vector3<f64>,
    /// Outboard axle joint, for driven corners.
    axle_outboard: Option<Vector3<f64>>,
}

impl PlacedKnuckle {
    /// Merge the moving points into the static chassis points.
    fn into_set(self, statics: &HardpointSet) -> HardpointSet {
        let mut points = statics.clone();
        points.insert(Hardpoint::UpperBallJoint, self.upper_ball_joint.into());
        points.insert(Hardpoint::LowerBallJoint, self.lower_ball_joint.into());
        points.insert(Hardpoint::TieRodOuter, self.tie_rod_outer.into());
        points.insert(Hardpoint::WheelCenter, self.wheel_center.into());
        points.insert(Hardpoint::Spindle, self.spindle.into());
        if let Some(axle_outboard) = self.axle_outboard {
            points.insert(Hardpoint::AxleOutboard, axle_outboard.into());
        }
        points
    }
}

impl SemiTrailingLink {
    /// Solve the corner at `travel` millimetres of wheel-center travel.
    ///
    /// The rotation angle is the unique solution on the branch through the
    /// static pose, so it is strictly monotonic in `travel`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`] when the wheel center cannot
    /// reach the requested height on its circle about the pivot axis.
    pub fn solve(&self, travel: f64) -> Result<Pose, GeometryError> {
        let swing = self.swing_for_travel(travel)?;
        let mut points = self.hardpoints().clone();
        for hardpoint in Self::carried_points(self.axle_length().is_some()) {
            if let Some(position) = self.hardpoints().get(hardpoint) {
                let moved = self.axis().rotate(&position.to_vector(), swing);
                points.insert(hardpoint, moved.into());
            }
        }
        Ok(Pose {
            swing_angle: swing,
            points,
        })
    }

    /// Rotation about the pivot axis that raises the wheel center by `travel`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`] when `travel` exceeds the height
    /// range of the wheel center's circle.
    pub fn swing_for_travel(&self, travel: f64) -> Result<f64, GeometryError> {
        let axis = self.axis();
        let wheel_center = self
            .hardpoints()
            .get(Hardpoint::WheelCenter)
            .map(|point| point.to_vector())
            .unwrap_or_default();
        let radial = wheel_center - axis.project(&wheel_center);
        let tangential = axis.direction.cross(&radial);

        // Height change at rotation θ is radial.z (cos θ − 1) + tangential.z sin θ.
        let amplitude = radial.z.hypot(tangential.z);
        if amplitude <= TOLERANCE {
            return Err(GeometryError::out_of_range(
                travel,
                "wheel center moves horizontally about the pivot axis",
            ));
        }
        let ratio = (travel + radial.z) / amplitude;
        if ratio.abs() > 1.0 + TOLERANCE {
            return Err(GeometryError::out_of_range(
                travel,
                "wheel center cannot reach the requested height",
            ));
        }
        let phase = tangential.z.atan2(radial.z);
        let spread = ratio.clamp(-1.0, 1.0).acos();
        Ok(if phase >= 0.0 {
            phase - spread
        } else {
            phase + spread
        })
    }
}
